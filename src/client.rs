use crate::audits;
use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{
    AuditData, AuditRecord, FetchedProfile, GraphqlResponse, ProfileData, ProfileSummary,
    SkillRecord, UserIdentity,
};
use crate::session::SessionToken;
use crate::skills;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde_json::Value;
use tracing::{debug, error, info, warn};

const RECENT_LIMIT: usize = 5;

/// Talks to the auth endpoint and the GraphQL endpoint.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    auth_url: String,
    graphql_url: String,
    path_scope: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            auth_url: config.auth_url.clone(),
            graphql_url: config.graphql_url.clone(),
            path_scope: config.path_scope.clone(),
        }
    }

    /// Exchanges Basic credentials for a session token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, FetchError> {
        let credentials = STANDARD.encode(format!("{username}:{password}"));
        let response = self
            .http
            .post(&self.auth_url)
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .send()
            .await
            .map_err(|err| FetchError::Auth(err.to_string()))?;

        let status = response.status();
        info!(%status, "auth response");
        if !status.is_success() {
            return Err(FetchError::Auth(format!("auth request failed: {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Auth(err.to_string()))?;
        token_from_body(&body).ok_or_else(|| FetchError::Auth("no token in auth response".into()))
    }

    /// Profile query, then the audit query for the returned user id.
    pub async fn fetch_profile(&self, token: &SessionToken) -> Result<FetchedProfile, FetchError> {
        let response = self.query(token, &profile_query(&self.path_scope)).await?;
        let body: GraphqlResponse<ProfileData> = response
            .json()
            .await
            .map_err(|err| FetchError::Data(format!("unreadable profile response: {err}")))?;
        if let Some(errors) = &body.errors {
            debug!(%errors, "profile query reported errors");
        }

        let data = body
            .data
            .ok_or_else(|| FetchError::Data("no user data received".into()))?;
        let (summary, skills) = summarize(data)?;
        info!(user_id = summary.identity.id, "profile loaded");

        let audits = match self.fetch_audits(token, summary.identity.id).await {
            Ok(audits) => Some(audits),
            Err(err) if err.invalidates_session() => return Err(err),
            Err(err) => {
                error!("audit section unavailable: {err}");
                None
            }
        };

        Ok(FetchedProfile {
            summary,
            skills,
            audits,
        })
    }

    async fn fetch_audits(
        &self,
        token: &SessionToken,
        user_id: i64,
    ) -> Result<Vec<AuditRecord>, FetchError> {
        let response = self.query(token, &audit_query(user_id)).await?;
        let body: GraphqlResponse<AuditData> = response
            .json()
            .await
            .map_err(|err| FetchError::Format(err.to_string()))?;
        let values = body
            .data
            .and_then(|data| data.audit)
            .ok_or_else(|| FetchError::Format("response has no audit list".into()))?;
        Ok(audits::records_from_values(&values))
    }

    async fn query(&self, token: &SessionToken, document: &str) -> Result<Response, FetchError> {
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(token.as_str())
            .json(&serde_json::json!({ "query": document }))
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = response.status();
        debug!(%status, "query response");
        if !status.is_success() {
            return Err(FetchError::Network(format!("query failed: {status}")));
        }
        Ok(response)
    }
}

/// The auth endpoint answers with either a JSON string or `{ "token": ... }`.
pub fn token_from_body(body: &str) -> Option<SessionToken> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let token = match &value {
        Value::String(token) => token.as_str(),
        Value::Object(fields) => fields.get("token")?.as_str()?,
        _ => return None,
    };
    let token = token.trim();
    (!token.is_empty()).then(|| SessionToken::new(token))
}

pub fn profile_query(scope: &str) -> String {
    format!(
        r#"{{
    user {{
        id
        login
        totalUp
        totalDown
        attrs
    }}
    transaction_aggregate(
        where: {{
            _and: [
                {{ type: {{ _eq: "xp" }} }},
                {{ path: {{ _like: "{scope}/%" }} }},
                {{ path: {{ _nlike: "{scope}/piscine-js/%" }} }}
            ]
        }}
    ) {{
        aggregate {{
            sum {{
                amount
            }}
        }}
    }}
    progressionSkill: user {{
        transactions(
            where: {{ type: {{ _like: "skill_%" }} }}
            distinct_on: type
            order_by: [{{ type: asc }}, {{ amount: desc }}]
        ) {{
            type
            amount
        }}
    }}
    recentProj: transaction(
        where: {{
            type: {{ _eq: "xp" }}
            _and: [
                {{ path: {{ _like: "{scope}%" }} }},
                {{ path: {{ _nlike: "{scope}/checkpoint%" }} }},
                {{ path: {{ _nlike: "{scope}/piscine-js%" }} }}
            ]
        }}
        order_by: {{ createdAt: desc }}
        limit: {RECENT_LIMIT}
    ) {{
        object {{
            name
        }}
    }}
}}"#
    )
}

pub fn audit_query(user_id: i64) -> String {
    format!(
        r#"{{
    audit(
        where: {{ auditor: {{ id: {{ _eq: {user_id} }} }}, private: {{ code: {{ _is_null: false }} }} }}
        order_by: {{ id: desc }}
        limit: {RECENT_LIMIT}
    ) {{
        createdAt
        auditedAt
        group {{
            path
            captain {{
                id
                firstName
                lastName
                login
            }}
        }}
        private {{
            code
        }}
    }}
}}"#
    )
}

/// Normalizes the profile payload; fails when there is no user record.
pub fn summarize(data: ProfileData) -> Result<(ProfileSummary, Vec<SkillRecord>), FetchError> {
    let ProfileData {
        user,
        transaction_aggregate,
        progression_skill,
        recent_proj,
    } = data;

    let Some(user) = user.into_iter().next() else {
        return Err(FetchError::Data("no user data received".into()));
    };

    let attrs = user.attrs.unwrap_or(Value::Null);
    let attr = |key: &str| attrs.get(key).and_then(Value::as_str).map(str::to_string);
    let identity = UserIdentity {
        id: user.id,
        first_name: attr("firstName").unwrap_or_default(),
        last_name: attr("lastName").unwrap_or_default(),
        gender: attr("gender"),
        login: user.login,
    };

    let total_xp = transaction_aggregate
        .and_then(|agg| agg.aggregate)
        .and_then(|agg| agg.sum)
        .and_then(|sum| sum.amount);

    let skills = match progression_skill.first() {
        Some(holder) => skills::records_from_value(&holder.transactions),
        None => Vec::new(),
    };

    let recent_projects: Vec<String> = recent_proj
        .into_iter()
        .filter_map(|project| project.object.and_then(|object| object.name))
        .take(RECENT_LIMIT)
        .collect();
    if recent_projects.is_empty() {
        warn!("no recent projects in profile response");
    }

    let summary = ProfileSummary {
        identity,
        total_xp,
        total_up: user.total_up.unwrap_or(0.0),
        total_down: user.total_down.unwrap_or(0.0),
        recent_projects,
    };
    Ok((summary, skills))
}
