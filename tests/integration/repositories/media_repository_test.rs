// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{record, setup_repo};
use mediacrawl::domain::models::media::ResourceType;
use mediacrawl::domain::repositories::media_repository::MediaRepository;

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let repo = setup_repo().await;
    let mut video = record("alice", "v1", "https://cdn.example.com/v1.mp4");
    video.resource_type = ResourceType::Video;
    let image = record("alice", "i1", "https://cdn.example.com/i1.jpg");

    let inserted = repo.save(&[video.clone(), image.clone()]).await.unwrap();
    assert_eq!(inserted, 2);

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded.len(), 2);
    let stored_video = loaded.iter().find(|r| r.resource_id == "v1").unwrap();
    assert_eq!(stored_video.id, video.id);
    assert_eq!(stored_video.resource_type, ResourceType::Video);
    assert_eq!(stored_video.resource_url, video.resource_url);
    assert_eq!(stored_video.user_id, "alice-id");
}

/// 重复的资源ID被静默忽略
#[tokio::test]
async fn test_duplicate_resource_ids_are_ignored() {
    let repo = setup_repo().await;

    repo.save(&[record("alice", "r1", "https://cdn.example.com/r1.jpg")])
        .await
        .unwrap();
    let inserted = repo
        .save(&[
            record("bob", "r1", "https://cdn.example.com/other.jpg"),
            record("bob", "r2", "https://cdn.example.com/r2.jpg"),
        ])
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded.len(), 2);
    let first = loaded.iter().find(|r| r.resource_id == "r1").unwrap();
    assert_eq!(first.user_name, "alice");
}

#[tokio::test]
async fn test_save_empty_batch() {
    let repo = setup_repo().await;

    assert_eq!(repo.save(&[]).await.unwrap(), 0);
    assert!(repo.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_resource_ids() {
    let repo = setup_repo().await;
    repo.save(&[
        record("alice", "r1", "https://cdn.example.com/r1.jpg"),
        record("bob", "r2", "https://cdn.example.com/r2.jpg"),
    ])
    .await
    .unwrap();

    let ids = repo.existing_resource_ids().await.unwrap();

    assert_eq!(ids.len(), 2);
    assert!(ids.contains("r1"));
    assert!(ids.contains("r2"));
}

#[tokio::test]
async fn test_processed_users_insert_or_ignore() {
    let repo = setup_repo().await;
    assert!(repo.processed_users().await.unwrap().is_empty());

    repo.add_processed_user("alice").await.unwrap();
    repo.add_processed_user("alice").await.unwrap();
    repo.add_processed_user("bob").await.unwrap();

    let users = repo.processed_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.contains("alice"));
    assert!(users.contains("bob"));
}
