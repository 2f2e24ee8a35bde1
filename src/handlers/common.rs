use crate::errors::ServiceError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// JSON body extractor whose rejections use the `{error}` body
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query-string extractor whose rejections use the `{error}` body
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Path extractor; malformed ids are a 400 with the `{error}` body
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Optional reporting window, `startDate` inclusive and `endDate` exclusive
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; a bare date covers that whole day
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parses a date query parameter. A bare `YYYY-MM-DD` end bound resolves to the
/// start of the following day so the whole day is included.
pub fn parse_date_param(
    name: &str,
    raw: &str,
    bound: DateBound,
) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid {name}: expected an ISO 8601 date (YYYY-MM-DD) or RFC 3339 timestamp"
        ))
    })?;
    let day = match bound {
        DateBound::Start => date,
        DateBound::End => date + Duration::days(1),
    };
    Ok(day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

impl DateRangeQuery {
    pub fn resolve(
        &self,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ServiceError> {
        let start = self
            .start_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_date_param("startDate", s, DateBound::Start))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_date_param("endDate", s, DateBound::End))
            .transpose()?;
        Ok((start, end))
    }
}
