mod common;

use std::fs;
use std::sync::atomic::Ordering;

use common::FakeContent;
use spacetraveling::cache::{Manifest, CACHE_DIR};

const POSTS: &[(&str, &str)] = &[
    ("como-utilizar-hooks", "Como utilizar Hooks"),
    ("criando-um-app-cra-do-zero", "Criando um app CRA do zero"),
    ("react-native", "React Native"),
];

#[tokio::test]
async fn test_generate_writes_every_route() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    let report = site.generate(&content, false).await.unwrap();
    assert_eq!(report.generated.len(), 1 + POSTS.len());
    assert!(report.skipped.is_empty());

    let public = dir.path().join("public");
    let home = fs::read_to_string(public.join("index.html")).unwrap();
    assert!(home.contains("<title>Home | spacetraveling.</title>"));
    assert!(home.contains("Como utilizar Hooks"));
    assert!(home.contains("15 mar 2021"));
    assert!(home.contains("Carregar mais posts"));

    let post = fs::read_to_string(public.join("post/react-native/index.html")).unwrap();
    assert!(post.contains("<title>React Native | spacetraveling</title>"));
    assert!(post.contains("<p>Lorem ipsum dolor sit amet</p>"));
    assert!(post.contains("1 min"));

    assert!(public.join("404.html").exists());
    assert!(public.join("css/style.css").exists());
    assert!(public.join("js/load-more.js").exists());
    assert!(dir.path().join(CACHE_DIR).join("manifest.json").exists());
}

#[tokio::test]
async fn test_fresh_routes_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    site.generate(&content, false).await.unwrap();
    let uid_calls = content.uid_calls.load(Ordering::SeqCst);

    let report = site.generate(&content, false).await.unwrap();
    assert!(report.generated.is_empty());
    assert_eq!(report.skipped.len(), 1 + POSTS.len());
    assert_eq!(content.uid_calls.load(Ordering::SeqCst), uid_calls);
}

#[tokio::test]
async fn test_force_and_expired_window_regenerate() {
    let dir = tempfile::tempdir().unwrap();
    let content = FakeContent::with_posts(POSTS, 2);

    let site = common::site(dir.path(), 3600);
    site.generate(&content, false).await.unwrap();
    content.set_title("react-native", "React Native 2").await;

    let forced = site.generate(&content, true).await.unwrap();
    assert_eq!(forced.generated.len(), 1 + POSTS.len());
    let post = fs::read_to_string(dir.path().join("public/post/react-native/index.html")).unwrap();
    assert!(post.contains("React Native 2"));

    // A zero window expires immediately
    let site = common::site(dir.path(), 0);
    site.generate(&content, false).await.unwrap();
    let again = site.generate(&content, false).await.unwrap();
    assert!(again.skipped.is_empty());
}

#[tokio::test]
async fn test_deleted_post_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    site.generate(&content, false).await.unwrap();
    let stale = dir.path().join("public/post/react-native/index.html");
    assert!(stale.exists());

    content.remove_post("react-native").await;
    let report = site.generate(&content, false).await.unwrap();
    assert_eq!(report.removed, vec!["/post/react-native".to_string()]);
    assert!(!stale.exists());

    let manifest = Manifest::load(dir.path());
    assert!(!manifest.routes.contains_key("/post/react-native"));
    assert!(manifest.routes.contains_key("/post/como-utilizar-hooks"));
}

#[tokio::test]
async fn test_clean_removes_output_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let site = common::site(dir.path(), 3600);
    let content = FakeContent::with_posts(POSTS, 2);

    site.generate(&content, false).await.unwrap();
    site.clean().unwrap();
    assert!(!dir.path().join("public").exists());
    assert!(!dir.path().join(CACHE_DIR).exists());
}
