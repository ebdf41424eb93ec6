mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{cursor, post_document, FakeContent};
use spacetraveling::commands::list;
use spacetraveling::listing::{ListingState, LoadMore};
use spacetraveling::pages::{home, post, StaticProps};
use spacetraveling::prismic::{ApiPage, ContentError, ContentService, Document, Lookup};

const POSTS: &[(&str, &str)] = &[
    ("como-utilizar-hooks", "Como utilizar Hooks"),
    ("criando-um-app-cra-do-zero", "Criando um app CRA do zero"),
    ("react-native", "React Native"),
    ("nextjs-isr", "Next.js ISR"),
    ("rust-no-front", "Rust no front"),
];

#[tokio::test]
async fn test_home_props_hold_first_page_and_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let props = home::get_static_props(&content, &site.config).await.unwrap();
    let StaticProps::Props { props, revalidate } = props else {
        panic!("listing should never be not-found");
    };

    assert_eq!(revalidate, Some(Duration::from_secs(3600)));
    let titles: Vec<_> = props
        .post_pagination
        .results
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Como utilizar Hooks", "Criando um app CRA do zero"]);
    assert_eq!(props.post_pagination.next_page, Some(cursor(2)));
}

#[tokio::test]
async fn test_post_props_found_and_missing() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let found = post::get_static_props(&content, &site.config, "react-native")
        .await
        .unwrap()
        .props()
        .unwrap();
    assert_eq!(found.post.slug, "react-native");
    assert_eq!(found.post.title, "React Native");
    assert_eq!(found.post.content.len(), 1);
    assert_eq!(found.post.content[0].heading, "Proin et varius");

    let missing = post::get_static_props(&content, &site.config, "nao-existe")
        .await
        .unwrap();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_static_paths_follow_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let slugs = post::get_static_paths(&content, &site.config).await.unwrap();
    let expected: Vec<_> = POSTS.iter().map(|(uid, _)| uid.to_string()).collect();
    assert_eq!(slugs, expected);
    assert_eq!(content.page_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_service_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);
    content.set_failing(true).await;

    assert!(home::get_static_props(&content, &site.config).await.is_err());
    assert!(post::get_static_props(&content, &site.config, "react-native")
        .await
        .is_err());
}

#[tokio::test]
async fn test_load_more_appends_until_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let initial = home::get_static_props(&content, &site.config)
        .await
        .unwrap()
        .props()
        .unwrap();
    let mut state = ListingState::new(initial.post_pagination);

    assert_eq!(state.load_more(&content).await.unwrap(), LoadMore::Loaded(2));
    assert_eq!(state.posts().len(), 4);
    assert_eq!(state.next_page(), Some(cursor(3).as_str()));

    assert_eq!(state.load_more(&content).await.unwrap(), LoadMore::Loaded(1));
    assert!(!state.has_more());

    assert_eq!(state.load_more(&content).await.unwrap(), LoadMore::Exhausted);
    assert_eq!(content.page_calls.load(Ordering::SeqCst), 2);

    let slugs: Vec<_> = state.posts().iter().map(|p| p.slug.as_str()).collect();
    let expected: Vec<_> = POSTS.iter().map(|(uid, _)| *uid).collect();
    assert_eq!(slugs, expected);
}

#[tokio::test]
async fn test_load_more_failure_keeps_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let initial = home::get_static_props(&content, &site.config)
        .await
        .unwrap()
        .props()
        .unwrap();
    let mut state = ListingState::new(initial.post_pagination);

    content.set_failing(true).await;
    assert!(state.load_more(&content).await.is_err());
    assert_eq!(state.posts().len(), 2);
    assert_eq!(state.next_page(), Some(cursor(2).as_str()));
    assert!(!state.is_loading());

    content.set_failing(false).await;
    assert_eq!(state.load_more(&content).await.unwrap(), LoadMore::Loaded(2));
}

#[tokio::test]
async fn test_list_all_walks_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let first_only = list::load(&site, &content, false).await.unwrap();
    assert_eq!(first_only.posts().len(), 2);
    assert!(first_only.has_more());

    let all = list::load(&site, &content, true).await.unwrap();
    assert_eq!(all.posts().len(), POSTS.len());
    assert!(!all.has_more());
}

/// Repository whose every page points back at page two
struct CyclingContent;

#[async_trait::async_trait]
impl ContentService for CyclingContent {
    async fn get_by_type(&self, _document_type: &str) -> Result<ApiPage<Document>, ContentError> {
        Ok(ApiPage::new(vec![post_document("primeiro", "Primeiro")], Some(cursor(2))))
    }

    async fn get_by_uid(
        &self,
        _document_type: &str,
        _uid: &str,
    ) -> Result<Lookup<Document>, ContentError> {
        Ok(Lookup::NotFound)
    }

    async fn fetch_page(&self, _cursor: &str) -> Result<ApiPage<Document>, ContentError> {
        Ok(ApiPage::new(vec![post_document("segundo", "Segundo")], Some(cursor(2))))
    }
}

#[tokio::test]
async fn test_list_all_stops_on_repeated_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);

    let load = list::load(&site, &CyclingContent, true);
    let state = tokio::time::timeout(Duration::from_secs(3), load)
        .await
        .expect("listing should stop on a repeated cursor")
        .unwrap();

    let slugs: Vec<_> = state.posts().iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["primeiro", "segundo"]);
    assert_eq!(state.next_page(), Some(cursor(2).as_str()));
}

