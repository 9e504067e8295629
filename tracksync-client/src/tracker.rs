//! Blocking Pivotal Tracker v5 client, scoped to one project.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracksync_core::types::{NewStory, Story, StoryState, StoryType, TrackerLabel};
use tracksync_core::{ApiError, Service, StoriesQuery, TrackerApi};

use crate::http::{decode, header_number, send};
use crate::pagination::{collect_pages, next_offset, Cursor, Page};

pub const DEFAULT_TRACKER_URL: &str = "https://www.pivotaltracker.com/services/v5";

const SERVICE: Service = Service::Tracker;
const TOTAL_HEADER: &str = "X-Tracker-Pagination-Total";

pub struct TrackerClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    project_id: u64,
}

impl TrackerClient {
    pub fn new(token: impl Into<String>, project_id: u64) -> Self {
        Self::with_base_url(token, project_id, DEFAULT_TRACKER_URL)
    }

    pub fn with_base_url(token: impl Into<String>, project_id: u64, base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("tracksync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            project_id,
        }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// Project-scoped URL: `<base>/projects/<id><path>`.
    fn url(&self, path: &str) -> String {
        format!("{}/projects/{}{}", self.base_url, self.project_id, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &self.url(path))
            .set("X-TrackerToken", &self.token)
    }

    fn get<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> Result<T, ApiError> {
        let response = send::<()>(SERVICE, operation, self.request("GET", path), None)?;
        decode(SERVICE, operation, response)
    }

    fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = send(SERVICE, operation, self.request(method, path), Some(body))?;
        decode(SERVICE, operation, response)
    }

    fn delete(&self, operation: &'static str, path: &str) -> Result<(), ApiError> {
        send::<()>(SERVICE, operation, self.request("DELETE", path), None)?;
        Ok(())
    }

    fn update_story(&self, story_id: u64, body: serde_json::Value) -> Result<Story, ApiError> {
        self.write("update story", "PUT", &format!("/stories/{story_id}"), &body)
    }
}

impl TrackerApi for TrackerClient {
    fn stories(&self, query: &StoriesQuery) -> Result<Vec<Story>, ApiError> {
        let params = query.params();
        collect_pages(Cursor::Offset(0), |cursor| {
            let offset = match cursor {
                Cursor::Offset(n) => n,
                Cursor::Page(_) => 0,
            };
            let mut request = self.request("GET", "/stories");
            for (key, value) in &params {
                request = request.query(key, value);
            }
            let request = request.query("offset", &offset.to_string());
            let response = send::<()>(SERVICE, "list stories", request, None)?;
            let total = header_number(&response, TOTAL_HEADER);
            let items: Vec<Story> = decode(SERVICE, "list stories", response)?;
            let next = next_offset(offset, items.len(), total);
            Ok(Page { items, next })
        })
    }

    fn create_story(&self, story: &NewStory) -> Result<Story, ApiError> {
        self.write("create story", "POST", "/stories", story)
    }

    fn delete_story(&self, story_id: u64) -> Result<(), ApiError> {
        self.delete("delete story", &format!("/stories/{story_id}"))
    }

    fn set_story_type(&self, story_id: u64, story_type: StoryType) -> Result<Story, ApiError> {
        self.update_story(story_id, json!({ "story_type": story_type }))
    }

    fn set_story_name(&self, story_id: u64, name: &str) -> Result<Story, ApiError> {
        self.update_story(story_id, json!({ "name": name }))
    }

    fn unschedule_story(&self, story_id: u64) -> Result<Story, ApiError> {
        self.update_story(story_id, json!({ "current_state": StoryState::Unscheduled }))
    }

    fn add_story_label(&self, story_id: u64, name: &str) -> Result<TrackerLabel, ApiError> {
        self.write(
            "add story label",
            "POST",
            &format!("/stories/{story_id}/labels"),
            &json!({ "name": name }),
        )
    }

    fn remove_story_label(&self, story_id: u64, label_id: u64) -> Result<(), ApiError> {
        self.delete(
            "remove story label",
            &format!("/stories/{story_id}/labels/{label_id}"),
        )
    }

    fn labels(&self) -> Result<Vec<TrackerLabel>, ApiError> {
        self.get("list labels", "/labels?fields=:default,counts")
    }

    fn delete_label(&self, label_id: u64) -> Result<(), ApiError> {
        self.delete("delete label", &format!("/labels/{label_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_project_scoped() {
        let client = TrackerClient::new("t", 42);
        assert_eq!(
            client.url("/stories/7"),
            "https://www.pivotaltracker.com/services/v5/projects/42/stories/7"
        );
    }

    #[test]
    fn custom_base_url() {
        let client = TrackerClient::with_base_url("t", 1, "http://localhost:8080/services/v5/");
        assert_eq!(client.url("/labels"), "http://localhost:8080/services/v5/projects/1/labels");
        assert_eq!(client.project_id(), 1);
    }
}
