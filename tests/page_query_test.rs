use axum::http::StatusCode;
use crudscope::DataScope;
use crudscope::models::PageRequest;
use crudscope::traits::PagedResource;

mod common;
use common::{
    get_json, ids, menu_entity::Menu, menus_uri, setup_test_app, setup_test_db, test_settings,
    token_for,
};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db, test_settings(false));

    let (status, body) = get_json(&app, "/api/menus", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1);
    assert_eq!(body["msg"], "Missing bearer token");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db, test_settings(false));

    let (status, _) = get_json(&app, "/api/menus", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = token_for(
        &{
            let mut other = test_settings(false);
            other.jwt.secret = "some-other-secret-some-other-secret".to_string();
            other
        },
        "",
    );
    let (status, body) = get_json(&app, "/api/menus", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Invalid access token signature");
}

#[tokio::test]
async fn test_soft_deleted_rows_are_hidden() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[("requireTotalCount", "true")]);
    let (status, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["totalCount"], 6);
    let mut rows = ids(&body);
    rows.sort();
    assert_eq!(rows, vec!["1", "2", "3", "4", "6", "7"]);
}

#[tokio::test]
async fn test_tenant_isolation() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(true);
    let t1 = token_for(&settings, "t1");
    let t2 = token_for(&settings, "t2");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[("sort", r#"[{"selector":"sort"}]"#)]);
    let (status, body) = get_json(&app, &uri, Some(&t1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["1", "2", "3", "4"]);

    let (_, body) = get_json(&app, &uri, Some(&t2)).await;
    assert_eq!(ids(&body), vec!["6", "7"]);

    let nobody = token_for(&test_settings(true), "");
    let (_, body) = get_json(&app, &uri, Some(&nobody)).await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_contains_filter() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[
        ("filter", r#"[["name","contains","System"]]"#),
        ("sort", r#"[{"selector":"sort"}]"#),
    ]);
    let (status, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["1", "7"]);
}

#[tokio::test]
async fn test_or_group_is_anded_with_the_rest() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[
        (
            "filter",
            r#"[["name","=","Users"],["code","=","role","or"],["code","=","report","or"],["sort","<","5"]]"#,
        ),
        ("sort", r#"[{"selector":"sort"}]"#),
    ]);
    let (status, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["2", "3"]);
}

#[tokio::test]
async fn test_membership_filters() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(true);
    let token = token_for(&settings, "t1");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[
        ("filter", r#"[["code","in","sys,menu,log"]]"#),
        ("sort", r#"[{"selector":"sort"}]"#),
    ]);
    let (_, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(ids(&body), vec!["1", "4"]);

    let uri = menus_uri(&[
        ("filter", r#"[["code","NOT IN","sys,user"]]"#),
        ("sort", r#"[{"selector":"sort"}]"#),
    ]);
    let (_, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(ids(&body), vec!["3", "4"]);

    let uri = menus_uri(&[
        ("filter", r#"[["code","in","sys"],["name","=","Roles","or"]]"#),
        ("sort", r#"[{"selector":"sort"}]"#),
    ]);
    let (_, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(ids(&body), vec!["1", "3"]);
}

#[tokio::test]
async fn test_sort_and_paging_with_total_count() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[
        ("requireTotalCount", "true"),
        ("take", "2"),
        ("skip", "1"),
        ("sort", r#"[{"selector":"sort","desc":true}]"#),
    ]);
    let (status, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 6);
    assert_eq!(ids(&body), vec!["6", "4"]);
}

#[tokio::test]
async fn test_total_count_is_zero_unless_requested() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let uri = menus_uri(&[("take", "1")]);
    let (_, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(body["data"]["totalCount"], 0);
    assert_eq!(ids(&body).len(), 1);
}

#[tokio::test]
async fn test_bad_requests() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let settings = test_settings(false);
    let token = token_for(&settings, "");
    let app = setup_test_app(db, settings);

    let cases = [
        (r#"[["name","like","Sys"]]"#, "unsupported filter operator `like`"),
        (r#"[["password","=","x"]]"#, "unknown field `password`"),
        (r#"[["name","="]]"#, "malformed filter"),
        (r#"{"name":"x"}"#, "malformed filter"),
    ];
    for (filter, expected) in cases {
        let uri = menus_uri(&[("filter", filter)]);
        let (status, body) = get_json(&app, &uri, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{filter}");
        assert_eq!(body["code"], 1);
        let msg = body["msg"].as_str().unwrap_or_default();
        assert!(msg.contains(expected), "{filter}: {msg}");
    }

    let uri = menus_uri(&[("sort", r#"["name","DESC"]"#)]);
    let (status, body) = get_json(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].as_str().unwrap_or_default().contains("malformed sort"));
}

#[tokio::test]
async fn test_get_page_without_http() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let request = PageRequest {
        require_total_count: true,
        take: 1,
        filter: r#"[["sort",">=","3"]]"#.to_string(),
        sort: r#"[{"selector":"sort"}]"#.to_string(),
        ..Default::default()
    };
    let scope = DataScope::new(true, Some("t1".to_string()));
    let page = Menu::get_page(&db, &request, &scope).await.unwrap();
    assert_eq!(page.total_count, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].code, "role");
}
