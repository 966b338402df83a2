//! `WarehouseMetadata` over the BigQuery REST API.

use super::config::BigQueryConfig;
use super::token::TokenSource;
use super::wire::{QueryRequest, QueryResponse, Row, Table, TableList};
use async_trait::async_trait;
use ragumami_core::{TableColumn, TableSchema, Website};
use ragumami_error::{SchemaError, SchemaErrorKind};
use ragumami_interface::WarehouseMetadata;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Read-only metadata client for one BigQuery dataset.
#[derive(Debug)]
pub struct BigQueryMetadataClient {
    client: reqwest::Client,
    config: BigQueryConfig,
    tokens: TokenSource,
}

impl BigQueryMetadataClient {
    /// Create a client. Uses the configured access token when present and the
    /// metadata server otherwise.
    #[instrument(name = "bigquery_client_new", skip(config), fields(project = %config.project_id(), dataset = %config.dataset()))]
    pub fn new(config: BigQueryConfig) -> Result<Self, SchemaError> {
        config.validate()?;

        let tokens = match config.access_token() {
            Some(token) if !token.trim().is_empty() => TokenSource::Static(token.clone()),
            _ => TokenSource::metadata_server(config.metadata_token_url()),
        };

        Self::with_token_source(config, tokens)
    }

    /// Create a client with an explicit token source.
    pub fn with_token_source(
        config: BigQueryConfig,
        tokens: TokenSource,
    ) -> Result<Self, SchemaError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SchemaError::new(SchemaErrorKind::Connection(e.to_string())))?;

        info!(
            location = %config.location(),
            static_token = matches!(tokens, TokenSource::Static(_)),
            "Creating BigQuery metadata client"
        );

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &BigQueryConfig {
        &self.config
    }

    /// Send an authorized request and decode the JSON response.
    ///
    /// A 404 becomes `TableNotFound` when `table` is given.
    async fn send<T>(
        &self,
        request: reqwest::RequestBuilder,
        table: Option<&str>,
    ) -> Result<T, SchemaError>
    where
        T: DeserializeOwned,
    {
        let token = self.tokens.token(&self.client).await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SchemaError::new(SchemaErrorKind::Connection(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body, table));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SchemaError::new(SchemaErrorKind::Deserialization(e.to_string())))
    }

    /// Run a standard SQL query and collect every result page.
    ///
    /// An incomplete job is polled through `getQueryResults` until it
    /// completes or the query deadline passes.
    async fn query_rows(&self, sql: &str) -> Result<Vec<Row>, SchemaError> {
        let deadline = Instant::now() + self.config.query_deadline();
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            location: self.config.location(),
            timeout_ms: self.config.job_wait_ms(),
        };
        let mut response: QueryResponse = self
            .send(self.client.post(self.config.query_url()).json(&body), None)
            .await?;

        let job_id = response.job_reference.as_ref().map(|r| r.job_id.clone());
        let mut rows = Vec::new();

        loop {
            if !response.job_complete {
                let Some(job_id) = &job_id else {
                    return Err(SchemaError::new(SchemaErrorKind::Query(
                        "incomplete query without a job reference".to_string(),
                    )));
                };
                if Instant::now() >= deadline {
                    return Err(SchemaError::new(SchemaErrorKind::Query(format!(
                        "query job {} did not complete within {} ms",
                        job_id,
                        self.config.query_deadline_ms()
                    ))));
                }
                debug!(job_id = %job_id, "Waiting for query job to complete");
                response = self.query_results(job_id, None).await?;
                continue;
            }
            rows.append(&mut response.rows);

            let (Some(page_token), Some(job_id)) = (response.page_token.take(), &job_id) else {
                break;
            };
            debug!(job_id = %job_id, "Fetching next result page");
            response = self.query_results(job_id, Some(&page_token)).await?;
        }

        Ok(rows)
    }

    /// `getQueryResults` for a job, optionally from a page token.
    async fn query_results(
        &self,
        job_id: &str,
        page_token: Option<&str>,
    ) -> Result<QueryResponse, SchemaError> {
        let wait_ms = self.config.job_wait_ms().to_string();
        let mut params = vec![
            ("location", self.config.location().as_str()),
            ("timeoutMs", wait_ms.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        self.send(
            self.client
                .get(self.config.query_results_url(job_id))
                .query(&params),
            None,
        )
        .await
    }
}

fn classify_status(status: u16, body: String, table: Option<&str>) -> SchemaError {
    match (status, table) {
        (401 | 403, _) => SchemaError::new(SchemaErrorKind::Auth(format!(
            "BigQuery returned {}: {}",
            status, body
        ))),
        (404, Some(table)) => SchemaError::new(SchemaErrorKind::TableNotFound(table.to_string())),
        _ => SchemaError::new(SchemaErrorKind::Query(format!(
            "BigQuery returned {}: {}",
            status, body
        ))),
    }
}

fn website_from_row(row: &Row) -> Result<Website, SchemaError> {
    let missing = |column: &str| {
        SchemaError::new(SchemaErrorKind::Deserialization(format!(
            "website row without {}",
            column
        )))
    };

    Ok(Website {
        id: row.text(0).ok_or_else(|| missing("website_id"))?,
        name: row.text(1).ok_or_else(|| missing("name"))?,
        domain: row.text(2),
    })
}

#[async_trait]
impl WarehouseMetadata for BigQueryMetadataClient {
    fn project_id(&self) -> &str {
        self.config.project_id()
    }

    fn dataset(&self) -> &str {
        self.config.dataset()
    }

    #[instrument(skip(self))]
    async fn list_websites(&self) -> Result<Vec<Website>, SchemaError> {
        let sql = format!(
            "SELECT website_id, name, domain FROM `{}.{}.public_website` ORDER BY name",
            self.config.project_id(),
            self.config.dataset()
        );

        let websites = self
            .query_rows(&sql)
            .await?
            .iter()
            .map(website_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = websites.len(), "Listed websites");
        Ok(websites)
    }

    #[instrument(skip(self))]
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(self.config.tables_url());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: TableList = self.send(request, None).await?;
            tables.extend(
                page.tables
                    .into_iter()
                    .map(|entry| entry.table_reference.table_id),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = tables.len(), "Listed tables");
        Ok(tables)
    }

    #[instrument(skip(self))]
    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, SchemaError> {
        let table: Table = self
            .send(
                self.client.get(self.config.table_url(table_name)),
                Some(table_name),
            )
            .await?;

        let columns = table
            .schema
            .map(|schema| schema.fields)
            .unwrap_or_default()
            .into_iter()
            .map(|field| TableColumn {
                name: field.name,
                data_type: field.data_type,
                mode: field.mode.unwrap_or_else(|| "NULLABLE".to_string()),
                description: field.description,
            })
            .collect();

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
        })
    }

    #[instrument(skip(self))]
    async fn is_healthy(&self) -> bool {
        match self
            .send::<serde_json::Value>(self.client.get(self.config.dataset_url()), None)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e.kind, "BigQuery health check failed");
                false
            }
        }
    }
}
