use chrono::{TimeZone, Utc};
use rstest::rstest;
use tracksync_core::types::{Issue, LinkLabel, Story, StoryState, StoryType, User};
use tracksync_renderer::Renderer;

fn story(id: u64, name: &str, state: StoryState) -> Story {
    Story {
        id,
        url: format!("https://www.pivotaltracker.com/story/show/{id}"),
        name: name.to_string(),
        description: None,
        story_type: StoryType::Chore,
        state,
        labels: vec![],
        accepted_at: None,
    }
}

fn issue() -> Issue {
    Issue {
        number: 42,
        title: "Widgets break on Tuesdays".to_string(),
        body: None,
        state: Default::default(),
        labels: vec![],
        user: User {
            id: 7,
            login: "octo".to_string(),
            html_url: "https://github.com/octo".to_string(),
        },
        html_url: "https://github.com/acme/widgets/issues/42".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(),
        pull_request: None,
        repository_url: None,
    }
}

#[test]
fn status_comment_matches_expected_text() {
    let renderer = Renderer::new().expect("renderer");
    let body = renderer
        .status_comment(&[
            story(1, "First", StoryState::Accepted),
            story(2, "Second", StoryState::Started),
        ])
        .expect("render");

    let expected = "Hi there!\n\
\n\
We use Pivotal Tracker to provide visibility into what our team is working on. A story for this issue has been automatically created.\n\
\n\
The current status is as follows:\n\
\n\
* [x] [#1](https://www.pivotaltracker.com/story/show/1) First\n\
* [ ] [#2](https://www.pivotaltracker.com/story/show/2) Second\n\
\n\
\n\
This comment, as well as the labels on the issue, will be automatically updated as the status in Tracker changes.";
    assert_eq!(body, expected);
}

#[test]
fn closed_comment_lists_every_story() {
    let renderer = Renderer::new().expect("renderer");
    let body = renderer
        .closed_comment(&[story(9, "Ship it", StoryState::Accepted)])
        .expect("render");
    assert!(body.starts_with("Hello again!\n\n"));
    assert!(body.contains("\n* [#9](https://www.pivotaltracker.com/story/show/9) Ship it\n"));
    assert!(body.ends_with("leave a comment and we'll reopen if necessary!"));
}

#[rstest]
#[case(StoryState::Accepted, "[x]")]
#[case(StoryState::Delivered, "[ ]")]
#[case(StoryState::Unscheduled, "[ ]")]
#[case(StoryState::Unknown("icebox".to_string()), "[ ]")]
fn checkbox_reflects_acceptance(#[case] state: StoryState, #[case] checkbox: &str) {
    let renderer = Renderer::new().expect("renderer");
    let body = renderer
        .status_comment(&[story(3, "Third", state)])
        .expect("render");
    assert!(body.contains(&format!("* {checkbox} [#3]")), "got: {body}");
}

#[test]
fn story_names_are_not_html_escaped() {
    let renderer = Renderer::new().expect("renderer");
    let body = renderer
        .status_comment(&[story(4, "Use <T> & friends", StoryState::Planned)])
        .expect("render");
    assert!(body.contains("Use <T> & friends"));
}

#[test]
fn opened_description_credits_creation_day() {
    let renderer = Renderer::new().expect("renderer");
    let link = LinkLabel::from("acme/widgets#42");
    let description = renderer
        .opened_description(&issue(), &link)
        .expect("render");
    assert_eq!(
        description,
        "[@octo](https://github.com/octo) opened [acme/widgets#42](https://github.com/acme/widgets/issues/42) on January 2"
    );
}

#[test]
fn reopened_description_credits_update_day() {
    let renderer = Renderer::new().expect("renderer");
    let link = LinkLabel::from("acme/widgets#42");
    let description = renderer
        .reopened_description(&issue(), &link)
        .expect("render");
    assert_eq!(
        description,
        "[@octo](https://github.com/octo) reopened [acme/widgets#42](https://github.com/acme/widgets/issues/42) on February 29"
    );
}
