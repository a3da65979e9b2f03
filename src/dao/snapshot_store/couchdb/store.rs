use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::dao::{
    models::{
        CourtKey, CourtSnapshotEntity, NotifiedSnapshotEntity, PoolSnapshotEntity, RawSnapshot,
        is_stale,
    },
    snapshot_store::{
        SnapshotStore, court_doc_id, court_prefix, is_snapshot_doc, notified_doc_id, pool_doc_id,
    },
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, BulkDocsRequest, DeletedDocument, END_SUFFIX, RevisionOnly, revision_of,
        to_document,
    },
};

const ALL_DOCS: &str = "_all_docs";
const BULK_DOCS: &str = "_bulk_docs";

/// Snapshot store backed by a CouchDB database, one document per snapshot.
#[derive(Clone)]
pub struct CouchSnapshotStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchSnapshotStore {
    /// Connect to CouchDB and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        // club ids may contain '/', which CouchDB would read as a path separator
        let path = path.replace('/', "%2F");
        let url = format!("{}/{}", self.database_url(), path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document(&self, doc_id: &str) -> CouchResult<Option<Value>> {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<Value>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn current_revision(&self, doc_id: &str) -> CouchResult<Option<String>> {
        Ok(self
            .get_document(doc_id)
            .await?
            .and_then(|doc| serde_json::from_value::<RevisionOnly>(doc).ok())
            .map(|doc| doc.rev))
    }

    /// Create or overwrite a document, carrying over the current revision.
    async fn upsert<T: Serialize>(&self, doc_id: &str, entity: &T) -> CouchResult<()> {
        let rev = self.current_revision(doc_id).await?;
        let document = to_document(doc_id, rev, entity)?;
        let response = self
            .request(Method::PUT, doc_id)
            .json(&document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str) -> CouchResult<()> {
        let Some(rev) = self.current_revision(doc_id).await? else {
            return Ok(());
        };
        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Documents whose id starts with `prefix`; an empty prefix lists the whole database.
    async fn list_documents(&self, prefix: &str) -> CouchResult<Vec<RawSnapshot>> {
        let mut query = vec![("include_docs", "true".to_string())];
        if !prefix.is_empty() {
            query.push(("startkey", format!("\"{}\"", prefix)));
            query.push(("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)));
        }

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        Ok(payload
            .rows
            .into_iter()
            .filter_map(|row| {
                row.doc.map(|value| RawSnapshot {
                    key: row.id,
                    value,
                })
            })
            .collect())
    }

    async fn bulk_delete(&self, docs: Vec<DeletedDocument>) -> CouchResult<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let count = docs.len();
        let response = self
            .request(Method::POST, BULK_DOCS)
            .json(&BulkDocsRequest { docs })
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: BULK_DOCS.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(count)
        } else {
            Err(CouchDaoError::RequestStatus {
                path: BULK_DOCS.to_string(),
                status: response.status(),
            })
        }
    }

    async fn find(&self, doc_id: String) -> CouchResult<Option<RawSnapshot>> {
        Ok(self
            .get_document(&doc_id)
            .await?
            .map(|value| RawSnapshot { key: doc_id, value }))
    }
}

impl SnapshotStore for CouchSnapshotStore {
    fn put_court(&self, snapshot: CourtSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = court_doc_id(&snapshot.key());
            store.upsert(&doc_id, &snapshot).await.map_err(Into::into)
        })
    }

    fn delete_court(&self, key: CourtKey) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_document(&court_doc_id(&key))
                .await
                .map_err(Into::into)
        })
    }

    fn list_courts(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RawSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_documents(&court_prefix(&club_id, &date))
                .await
                .map_err(Into::into)
        })
    }

    fn put_pool(&self, pool: PoolSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = pool_doc_id(&pool.club_id, &pool.date);
            store.upsert(&doc_id, &pool).await.map_err(Into::into)
        })
    }

    fn find_pool(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find(pool_doc_id(&club_id, &date))
                .await
                .map_err(Into::into)
        })
    }

    fn put_notified(
        &self,
        notified: NotifiedSnapshotEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = notified_doc_id(&notified.club_id, &notified.date);
            store.upsert(&doc_id, &notified).await.map_err(Into::into)
        })
    }

    fn find_notified(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find(notified_doc_id(&club_id, &date))
                .await
                .map_err(Into::into)
        })
    }

    fn purge_stale(&self, today: String) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            let stale = store
                .list_documents("")
                .await?
                .into_iter()
                .filter(|doc| is_snapshot_doc(&doc.key) && is_stale(&doc.value, &today))
                .filter_map(|doc| {
                    revision_of(&doc.value).map(|rev| DeletedDocument {
                        id: doc.key,
                        rev,
                        deleted: true,
                    })
                })
                .collect();
            store.bulk_delete(stale).await.map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
