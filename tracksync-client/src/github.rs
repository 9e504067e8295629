//! Blocking GitHub REST v3 client.

use std::cell::Cell;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracksync_core::types::{GithubLabel, Issue, IssueComment, IssueState, RepoRef, Repository, User};
use tracksync_core::{ApiError, GithubApi, Service};

use crate::http::{decode, header_number, send};
use crate::pagination::{collect_pages, next_page_from_link, Cursor, Page};

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

const PER_PAGE: &str = "100";
const SERVICE: Service = Service::Github;

#[derive(Deserialize)]
struct SearchResults {
    items: Vec<Issue>,
}

#[derive(Serialize)]
struct CreateLabel<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    color: &'a str,
}

/// GitHub client bound to one token and API root.
pub struct GithubClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    rate_limit_remaining: Cell<Option<u32>>,
}

impl GithubClient {
    /// `base_url` overrides the API root, e.g. `https://ghe.example.com/api/v3/`.
    pub fn new(token: impl Into<String>, base_url: Option<&str>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("tracksync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url
                .unwrap_or(DEFAULT_GITHUB_URL)
                .trim_end_matches('/')
                .to_string(),
            token: token.into(),
            rate_limit_remaining: Cell::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &self.url(path))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    fn execute<B: Serialize>(
        &self,
        operation: &'static str,
        request: ureq::Request,
        body: Option<&B>,
    ) -> Result<ureq::Response, ApiError> {
        let response = send(SERVICE, operation, request, body)?;
        if let Some(remaining) = header_number(&response, "X-RateLimit-Remaining") {
            self.rate_limit_remaining.set(Some(remaining));
        }
        Ok(response)
    }

    fn get<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> Result<T, ApiError> {
        let response = self.execute::<()>(operation, self.request("GET", path), None)?;
        decode(SERVICE, operation, response)
    }

    fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(operation, self.request(method, path), Some(body))?;
        decode(SERVICE, operation, response)
    }

    fn delete(&self, operation: &'static str, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(operation, self.request("DELETE", path), None)?;
        Ok(())
    }

    /// Every page of a list endpoint. `unwrap` turns one decoded page into items.
    fn get_all<R, T>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
        unwrap: impl Fn(R) -> Vec<T>,
    ) -> Result<Vec<T>, ApiError>
    where
        R: DeserializeOwned,
    {
        collect_pages(Cursor::Page(1), |cursor| {
            let page = match cursor {
                Cursor::Page(n) => n,
                Cursor::Offset(_) => 1,
            };
            let mut request = self
                .request("GET", path)
                .query("per_page", PER_PAGE)
                .query("page", &page.to_string());
            for (key, value) in query {
                request = request.query(key, value);
            }
            let response = self.execute::<()>(operation, request, None)?;
            let next = next_page_from_link(response.header("Link")).map(Cursor::Page);
            let items = unwrap(decode(SERVICE, operation, response)?);
            Ok(Page { items, next })
        })
    }
}

fn repo_path(repo: &RepoRef) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(&repo.owner),
        urlencoding::encode(&repo.name)
    )
}

impl GithubApi for GithubClient {
    fn current_user(&self) -> Result<User, ApiError> {
        self.get("get current user", "/user")
    }

    fn org_repositories(&self, org: &str) -> Result<Vec<Repository>, ApiError> {
        let path = format!("/orgs/{}/repos", urlencoding::encode(org));
        self.get_all("list organization repositories", &path, &[("type", "public")], |r| r)
    }

    fn user_repositories(&self, user: &str) -> Result<Vec<Repository>, ApiError> {
        let path = format!("/users/{}/repos", urlencoding::encode(user));
        let repos: Vec<Repository> =
            self.get_all("list user repositories", &path, &[("type", "owner")], |r| r)?;
        Ok(repos.into_iter().filter(|r| !r.private).collect())
    }

    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, ApiError> {
        let path = format!("{}/issues", repo_path(repo));
        self.get_all("list issues", &path, &[("state", "open")], |r| r)
    }

    fn search_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError> {
        self.get_all(
            "search issues",
            "/search/issues",
            &[("q", query)],
            |r: SearchResults| r.items,
        )
    }

    fn labels(&self, repo: &RepoRef) -> Result<Vec<GithubLabel>, ApiError> {
        let path = format!("{}/labels", repo_path(repo));
        self.get_all("list labels", &path, &[], |r| r)
    }

    fn create_label(&self, repo: &RepoRef, name: &str, color: &str) -> Result<GithubLabel, ApiError> {
        let path = format!("{}/labels", repo_path(repo));
        self.write("create label", "POST", &path, &CreateLabel { name, color })
    }

    fn update_label_color(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<GithubLabel, ApiError> {
        let path = format!("{}/labels/{}", repo_path(repo), urlencoding::encode(name));
        self.write("update label", "PATCH", &path, &json!({ "color": color }))
    }

    fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<IssueComment>, ApiError> {
        let path = format!("{}/issues/{number}/comments", repo_path(repo));
        self.get_all("list comments", &path, &[], |r| r)
    }

    fn create_comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<IssueComment, ApiError> {
        let path = format!("{}/issues/{number}/comments", repo_path(repo));
        self.write("create comment", "POST", &path, &json!({ "body": body }))
    }

    fn edit_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError> {
        let path = format!("{}/issues/comments/{comment_id}", repo_path(repo));
        self.write("edit comment", "PATCH", &path, &json!({ "body": body }))
    }

    fn add_issue_labels(&self, repo: &RepoRef, number: u64, labels: &[String]) -> Result<(), ApiError> {
        let path = format!("{}/issues/{number}/labels", repo_path(repo));
        let request = self.request("POST", &path);
        self.execute("add labels", request, Some(&json!({ "labels": labels })))?;
        Ok(())
    }

    fn remove_issue_label(&self, repo: &RepoRef, number: u64, label: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/issues/{number}/labels/{}",
            repo_path(repo),
            urlencoding::encode(label)
        );
        self.delete("remove label", &path)
    }

    fn set_issue_state(&self, repo: &RepoRef, number: u64, state: IssueState) -> Result<(), ApiError> {
        let path = format!("{}/issues/{number}", repo_path(repo));
        let request = self.request("PATCH", &path);
        self.execute("edit issue", request, Some(&json!({ "state": state })))?;
        Ok(())
    }

    fn rate_limit_remaining(&self) -> Option<u32> {
        self.rate_limit_remaining.get()
    }
}
