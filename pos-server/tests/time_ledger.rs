mod common;

use http::StatusCode;
use serde_json::json;

// 2024-05-03 02:00:30 UTC → 10:30:45 UTC
const LOGIN: i64 = 1_714_701_630_000;
const LOGOUT: i64 = 1_714_732_245_000;

#[tokio::test]
async fn shift_round_trip_updates_monthly_total() {
    let app = common::setup().await;
    let waiter = app.waiter("emp-1");

    let (status, interval) = app
        .send(
            "POST",
            "/api/time-ledger/emp-1/open",
            Some(&waiter),
            Some(json!({ "at": LOGIN })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{interval}");
    assert_eq!(interval["year"], 2024);
    assert_eq!(interval["month"], 5);
    assert!(interval["logged_out_at"].is_null());

    let (status, closed) = app
        .send(
            "POST",
            "/api/time-ledger/emp-1/close",
            Some(&waiter),
            Some(json!({ "at": LOGOUT })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{closed}");
    assert_eq!(closed["monthly_total"], json!({ "hours": 8, "minutes": 30 }));
    assert_eq!(closed["interval"]["total"], json!({ "hours": 8, "minutes": 30 }));

    let (status, month) = app
        .send("GET", "/api/time-ledger/emp-1/months/2024/5", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(month["shifts"].as_array().unwrap().len(), 1);
    assert_eq!(month["monthly_total"]["hours"], 8);
    assert_eq!(month["shifts"][0]["total"]["minutes"], 30);
}

#[tokio::test]
async fn recent_total_covers_the_last_days() {
    let app = common::setup().await;
    let waiter = app.waiter("emp-1");
    let now = chrono::Utc::now().timestamp_millis();
    let hour = 3_600_000;

    for (open, close) in [(now - 3 * hour, now - 2 * hour), (now - 90 * 60_000, now - 60_000)] {
        app.send("POST", "/api/time-ledger/emp-1/open", Some(&waiter), Some(json!({ "at": open })))
            .await;
        let (status, body) = app
            .send("POST", "/api/time-ledger/emp-1/close", Some(&waiter), Some(json!({ "at": close })))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    // shift from two months ago stays out of the default window
    app.send("POST", "/api/time-ledger/emp-1/open", Some(&waiter), Some(json!({ "at": now - 60 * 24 * hour })))
        .await;
    app.send("POST", "/api/time-ledger/emp-1/close", Some(&waiter), Some(json!({ "at": now - 59 * 24 * hour })))
        .await;

    let (status, recent) = app
        .send("GET", "/api/time-ledger/emp-1/recent", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{recent}");
    assert_eq!(recent["days"], 30);
    assert_eq!(recent["total"], json!({ "hours": 2, "minutes": 29 }));

    let (status, recent) = app
        .send("GET", "/api/time-ledger/emp-1/recent?days=90", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent["total"]["hours"], 26);

    let (status, body) = app
        .send("GET", "/api/time-ledger/emp-1/recent?days=0", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8);

    let (status, _) = app
        .send("GET", "/api/time-ledger/emp-2/recent", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn open_and_close_conflicts() {
    let app = common::setup().await;
    let waiter = app.waiter("emp-1");

    let (status, _) = app
        .send("POST", "/api/time-ledger/emp-1/open", Some(&waiter), Some(json!({ "at": LOGIN })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("POST", "/api/time-ledger/emp-1/open", Some(&waiter), Some(json!({ "at": LOGIN + 60_000 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5003);

    app.send("POST", "/api/time-ledger/emp-1/close", Some(&waiter), Some(json!({ "at": LOGOUT })))
        .await;
    let (status, body) = app
        .send("POST", "/api/time-ledger/emp-1/close", Some(&waiter), Some(json!({ "at": LOGOUT })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5004);
}

#[tokio::test]
async fn unknown_ledger_and_month_are_not_found() {
    let app = common::setup().await;
    let manager = app.manager();

    let (status, body) = app
        .send("GET", "/api/time-ledger/ghost/months/2024/5", Some(&manager), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5001);

    app.send("POST", "/api/time-ledger/emp-2/open", Some(&manager), Some(json!({ "at": LOGIN })))
        .await;
    let (status, body) = app
        .send("GET", "/api/time-ledger/emp-2/months/2024/4", Some(&manager), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5002);
}

#[tokio::test]
async fn waiter_cannot_touch_other_ledgers() {
    let app = common::setup().await;
    let waiter = app.waiter("emp-1");

    let (status, body) = app
        .send("POST", "/api/time-ledger/emp-2/open", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, _) = app
        .send("POST", "/api/time-ledger/emp-1/open", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", "/api/time-ledger/force-close", Some(&waiter), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn force_close_reports_partial_failure() {
    let app = common::setup().await;
    let manager = app.manager();

    app.send("POST", "/api/time-ledger/emp-1/open", Some(&manager), Some(json!({ "at": LOGIN })))
        .await;
    // opened after the force-close instant, cannot be closed at it
    app.send("POST", "/api/time-ledger/late/open", Some(&manager), Some(json!({ "at": LOGOUT + 60_000 })))
        .await;

    let (status, body) = app
        .send("POST", "/api/time-ledger/force-close", Some(&manager), Some(json!({ "at": LOGOUT })))
        .await;
    assert_eq!(status, StatusCode::MULTI_STATUS, "{body}");
    assert_eq!(body["code"], 9);
    let outcome = &body["data"];
    assert_eq!(outcome["closed"].as_array().unwrap().len(), 1);
    assert_eq!(outcome["closed"][0]["employee_id"], "emp-1");
    assert_eq!(outcome["failed"].as_array().unwrap().len(), 1);
    assert_eq!(outcome["failed"][0]["employee_id"], "late");

    // nothing left to close for emp-1
    let (status, body) = app
        .send("POST", "/api/time-ledger/force-close", Some(&manager), Some(json!({ "at": LOGOUT + 120_000 })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["closed"][0]["employee_id"], "late");
    assert!(body["data"]["failed"].as_array().unwrap().is_empty());
}
