use std::collections::HashSet;

use super::*;
use crate::db::core::test_support::temp_database;
use crate::entity::{Location, Tag};

const TWO_ROWS: &str = "\
publicationDate,name,Headline,url,author,coverageLevel,tags,location,actor
2024-05-01,Gazette,Robbery on main street,u1,Ann Lee,local,Crime,Paris,Jane Doe
2024-05-02,Herald,Arrest made,u2,Bo Chen,national,Crime,Paris,Jane Doe
";

#[tokio::test]
async fn test_two_rows_build_the_full_graph() {
    let (db, _dir) = temp_database().await;

    let summary = run_import(&db, TWO_ROWS.as_bytes(), &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.rows_read, 2);
    assert_eq!(summary.tags, 1);
    assert_eq!(summary.locations, 1);
    assert_eq!(summary.articles, 2);
    assert_eq!(summary.actors, 1);
    assert_eq!(summary.links.references_added, 2);

    let tags = db.all_references::<Tag>().await.unwrap();
    let locations = db.all_references::<Location>().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "CRIME");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "PARIS");

    let articles = db.all_articles().await.unwrap();
    assert_eq!(articles.len(), 2);

    let actors = db.all_actors().await.unwrap();
    assert_eq!(actors.len(), 1);
    let jane = &actors[0];
    assert_eq!(jane.name, "Jane Doe");

    let article_ids: HashSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();
    let linked: HashSet<&str> = jane.article_ids.iter().map(String::as_str).collect();
    assert_eq!(linked, article_ids);

    for article in &articles {
        assert_eq!(article.tags, vec![tags[0].id.clone()]);
        assert_eq!(article.location.as_deref(), Some(locations[0].id.as_str()));
        assert_eq!(article.actors_mentioned, vec![jane.id.clone()]);
    }

    let u1 = db.find_article_by_url("u1").await.unwrap().unwrap();
    assert_eq!(u1.source_name.as_deref(), Some("Gazette"));
    assert_eq!(u1.headline.as_deref(), Some("Robbery on main street"));
    assert_eq!(u1.author.as_deref(), Some("Ann Lee"));
    assert_eq!(u1.coverage_level.as_deref(), Some("local"));
    assert_eq!(u1.publication_date.as_deref(), Some("2024-05-01"));
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let (db, _dir) = temp_database().await;
    let options = ImportOptions::default();

    run_import(&db, TWO_ROWS.as_bytes(), &options).await.unwrap();
    let articles = db.all_articles().await.unwrap();
    let actors = db.all_actors().await.unwrap();

    let summary = run_import(&db, TWO_ROWS.as_bytes(), &options).await.unwrap();

    assert_eq!(summary.links.references_added, 0);
    assert_eq!(db.all_articles().await.unwrap(), articles);
    assert_eq!(db.all_actors().await.unwrap(), actors);
    assert_eq!(db.all_references::<Tag>().await.unwrap().len(), 1);
    assert_eq!(db.all_references::<Location>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_later_import_extends_actor_and_links_new_article() {
    let (db, _dir) = temp_database().await;
    let options = ImportOptions::default();

    run_import(&db, TWO_ROWS.as_bytes(), &options).await.unwrap();

    let later = "\
url,tags,location,actor,Headline
u2,Politics,Lyon,Jane Doe,Changed headline
u3,Politics,Lyon,Jane Doe,New story
u3,,,John Roe,
";
    let summary = run_import(&db, later.as_bytes(), &options).await.unwrap();

    assert_eq!(summary.tags, 2);
    assert_eq!(summary.locations, 2);
    assert_eq!(summary.articles, 3);
    assert_eq!(summary.actors, 2);

    // First write wins for article content
    let u2 = db.find_article_by_url("u2").await.unwrap().unwrap();
    assert_eq!(u2.headline.as_deref(), Some("Arrest made"));

    let jane = db.find_actor_by_name("Jane Doe").await.unwrap().unwrap();
    let john = db.find_actor_by_name("John Roe").await.unwrap().unwrap();
    assert_eq!(jane.article_ids.len(), 3);

    let u3 = db.find_article_by_url("u3").await.unwrap().unwrap();
    assert!(u3.mentions(&jane.id));
    assert!(u3.mentions(&john.id));
    assert_eq!(u3.actors_mentioned.len(), 2);
}

#[tokio::test]
async fn test_rows_without_actor_or_references() {
    let (db, _dir) = temp_database().await;

    let source = "url,tags,location,actor\nu1,,,\n,Crime,Paris,Jane Doe\n";
    let summary = run_import(&db, source.as_bytes(), &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.rows_read, 2);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(summary.tags, 0);
    assert_eq!(summary.locations, 0);
    assert_eq!(summary.articles, 1);
    assert_eq!(summary.actor_groups, 0);
    assert_eq!(summary.actors, 0);

    let u1 = db.find_article_by_url("u1").await.unwrap().unwrap();
    assert!(u1.tags.is_empty());
    assert_eq!(u1.location, None);
    assert!(u1.actors_mentioned.is_empty());
}

#[tokio::test]
async fn test_normalized_names_are_shared() {
    let (db, _dir) = temp_database().await;

    let source = "url,tags,location\nu1,Faits divers,\"Île, de France\"\nu2,  faits   DIVERS ,Ile de France\n";
    run_import(&db, source.as_bytes(), &ImportOptions::default())
        .await
        .unwrap();

    let tags = db.all_references::<Tag>().await.unwrap();
    let locations = db.all_references::<Location>().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "FAITS_DIVERS");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "ILE_DE_FRANCE");
}

#[tokio::test]
async fn test_relink_repairs_missing_back_reference() {
    let (db, _dir) = temp_database().await;
    run_import(&db, TWO_ROWS.as_bytes(), &ImportOptions::default())
        .await
        .unwrap();

    let u1 = db.find_article_by_url("u1").await.unwrap().unwrap();
    db.update_article_actors_mentioned(&u1.id, &[]).await.unwrap();

    let stats = relink_all(&db).await.unwrap();
    assert_eq!(stats.references_added, 1);

    let stats = relink_all(&db).await.unwrap();
    assert_eq!(stats.references_added, 0);
}

#[tokio::test]
async fn test_import_csv_file_reports_missing_file() {
    let (db, dir) = temp_database().await;
    let missing = dir.path().join("missing.csv");

    let err = import_csv_file(&db, &missing, &ImportOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing.csv"));
}

#[tokio::test]
async fn test_import_csv_file_from_disk() {
    let (db, dir) = temp_database().await;
    let path = dir.path().join("articles.csv");
    std::fs::write(&path, TWO_ROWS).unwrap();

    let summary = import_csv_file(&db, &path, &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.articles, 2);
}

#[tokio::test]
async fn test_store_failure_aborts_remaining_stages() {
    let (db, _dir) = temp_database().await;
    sqlx::query("DROP TABLE actors")
        .execute(db.pool())
        .await
        .unwrap();

    let err = run_import(&db, TWO_ROWS.as_bytes(), &ImportOptions::default())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Jane Doe"));

    // Stages before the failure kept their writes, nothing after it ran
    let articles = db.all_articles().await.unwrap();
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.actors_mentioned.is_empty()));
    assert_eq!(db.all_references::<Tag>().await.unwrap().len(), 1);
}
