//! `reqwest`-backed collaborators sharing one client and an optional bearer token.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{
    AttendanceService, IntegrationError, IntegrationResult, MatchHistoryService, RosterService,
    SuggestionService,
    models::{
        AttendanceBatch, AttendanceRecord, MatchReport, RosterPlayer, STATUS_PRESENT,
        SuggestionOption, SuggestionRequest,
    },
};

/// Client shared by every HTTP collaborator.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    token: Option<Arc<str>>,
}

impl HttpClient {
    /// Client sending `token` as a bearer credential when set.
    pub fn new(token: Option<String>) -> IntegrationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| IntegrationError::ClientBuilder { source })?;
        Ok(Self {
            client,
            token: token.filter(|t| !t.is_empty()).map(Arc::from),
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, url: &str, builder: RequestBuilder) -> IntegrationResult<Response> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|source| IntegrationError::RequestSend {
                url: url.to_string(),
                source,
            })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(IntegrationError::RequestStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> IntegrationResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| IntegrationError::DecodeResponse {
                url: url.to_string(),
                source,
            })
    }
}

/// Roster fetched with `GET {url}?clubId=`.
pub struct HttpRoster {
    http: HttpClient,
    url: Arc<str>,
}

impl HttpRoster {
    /// Roster client rooted at `url`.
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: Arc::from(url),
        }
    }
}

impl RosterService for HttpRoster {
    fn fetch_players(
        &self,
        club_id: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<RosterPlayer>>> {
        let http = self.http.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let request = http.client.get(url.as_ref()).query(&[("clubId", club_id)]);
            let response = http.send(&url, request).await?;
            HttpClient::decode(&url, response).await
        })
    }
}

/// Attendance register over HTTP.
pub struct HttpAttendance {
    http: HttpClient,
    url: Arc<str>,
}

impl HttpAttendance {
    /// Attendance client rooted at `url`.
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: Arc::from(url),
        }
    }
}

impl AttendanceService for HttpAttendance {
    fn mark_present(&self, batch: AttendanceBatch) -> BoxFuture<'static, IntegrationResult<()>> {
        let http = self.http.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let request = http.client.post(url.as_ref()).json(&batch);
            http.send(&url, request).await.map(|_| ())
        })
    }

    fn present_records(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<AttendanceRecord>>> {
        let http = self.http.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let request = http
                .client
                .get(url.as_ref())
                .query(&[("date", date), ("clubId", club_id)]);
            let response = http.send(&url, request).await?;
            let records: Vec<AttendanceRecord> = HttpClient::decode(&url, response).await?;
            Ok(records
                .into_iter()
                .filter(|record| record.status.eq_ignore_ascii_case(STATUS_PRESENT))
                .collect())
        })
    }
}

/// Suggestion service over HTTP.
pub struct HttpSuggestions {
    http: HttpClient,
    url: Arc<str>,
}

impl HttpSuggestions {
    /// Suggestion client posting to `url`.
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: Arc::from(url),
        }
    }
}

impl SuggestionService for HttpSuggestions {
    fn suggest(
        &self,
        request: SuggestionRequest,
    ) -> BoxFuture<'static, IntegrationResult<Vec<SuggestionOption>>> {
        let http = self.http.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let builder = http.client.post(url.as_ref()).json(&request);
            let response = http.send(&url, builder).await?;
            HttpClient::decode(&url, response).await
        })
    }
}

/// Match history over HTTP.
pub struct HttpMatchHistory {
    http: HttpClient,
    url: Arc<str>,
}

impl HttpMatchHistory {
    /// Match history client posting to `url`.
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: Arc::from(url),
        }
    }
}

impl MatchHistoryService for HttpMatchHistory {
    fn record(&self, report: MatchReport) -> BoxFuture<'static, IntegrationResult<()>> {
        let http = self.http.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let request = http.client.post(url.as_ref()).json(&report);
            http.send(&url, request).await.map(|_| ())
        })
    }
}
