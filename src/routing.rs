//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    analytics::get_analytics_summary_endpoint,
    auth::{AuthState, auth_guard},
    bank::{create_bank_endpoint, get_billing_cycle_endpoint, list_banks_endpoint},
    bill::{
        create_bill_endpoint, get_bill_endpoint, list_bill_payments_endpoint, list_bills_endpoint,
        pay_bill_payment_endpoint, refresh_bill_payments_endpoint, unpay_bill_payment_endpoint,
        update_bill_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
        get_budget_progress_endpoint, list_budgets_endpoint,
    },
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    label::{
        create_label_endpoint, delete_label_endpoint, get_label_endpoint, list_labels_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::COFFEE, get(get_coffee));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::BANKS,
            get(list_banks_endpoint).post(create_bank_endpoint),
        )
        .route(endpoints::BILLING_CYCLE, get(get_billing_cycle_endpoint))
        .route(
            endpoints::LABELS,
            get(list_labels_endpoint).post(create_label_endpoint),
        )
        .route(
            endpoints::LABEL,
            get(get_label_endpoint).delete(delete_label_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(
            endpoints::BUDGET_PROGRESS,
            get(get_budget_progress_endpoint),
        )
        .route(
            endpoints::BILLS,
            get(list_bills_endpoint).post(create_bill_endpoint),
        )
        .route(
            endpoints::BILL,
            get(get_bill_endpoint).patch(update_bill_endpoint),
        )
        .route(endpoints::BILL_PAYMENTS, get(list_bill_payments_endpoint))
        .route(
            endpoints::REFRESH_BILL_PAYMENTS,
            post(refresh_bill_payments_endpoint),
        )
        .route(endpoints::PAY_BILL_PAYMENT, post(pay_bill_payment_endpoint))
        .route(
            endpoints::UNPAY_BILL_PAYMENT,
            post(unpay_bill_payment_endpoint),
        )
        .route(
            endpoints::ANALYTICS_SUMMARY,
            get(get_analytics_summary_endpoint),
        )
        .layer(middleware::from_fn_with_state(
            AuthState {
                cookie_key: state.cookie_key.clone(),
            },
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod routing_tests {
    use axum::http::{StatusCode, header::LOCATION};
    use axum_test::TestResponse;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{assert_error_response, get_test_data, get_test_server, session_cookie},
        timezone::local_today,
    };

    #[track_caller]
    fn location(response: &TestResponse) -> String {
        response
            .header(LOCATION)
            .to_str()
            .expect("Could not convert header to str")
            .to_owned()
    }

    #[tokio::test]
    async fn coffee_does_not_need_a_session() {
        let (conn, _) = get_test_data();
        let server = get_test_server(conn);

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn api_routes_need_a_session() {
        let (conn, _) = get_test_data();
        let server = get_test_server(conn);

        let response = server.get(endpoints::BILLS).await;

        assert_error_response(&response, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);

        let response = server
            .get("/api/nothing_here")
            .add_cookie(session_cookie(data.user_id))
            .await;

        assert_error_response(&response, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_body_is_rejected() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);

        let response = server
            .post(endpoints::BUDGETS)
            .add_cookie(session_cookie(data.user_id))
            .json(&json!({
                "category_id": data.category_id,
                "period": "FORTNIGHTLY",
                "amount": 100.0,
                "start_date": "2025-01-01",
            }))
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn pay_and_unpay_bill() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);
        let cookie = session_cookie(data.user_id);
        let today = local_today("Etc/UTC").unwrap();

        let response = server
            .post(endpoints::BILLS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "name": "Internet",
                "amount": 80.0,
                "category_id": data.category_id,
                "bank_id": data.bank_id,
                "frequency": "MONTHLY",
                "start_date": today.to_string(),
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let bill: Value = response.json();
        assert_eq!(
            location(&response),
            format_endpoint(endpoints::BILL, bill["id"].as_i64().unwrap())
        );

        let response = server
            .post(endpoints::REFRESH_BILL_PAYMENTS)
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        let refresh: Value = response.json();
        assert!(refresh["created"].as_u64().unwrap() >= 1);

        let payments: Value = server
            .get(endpoints::BILL_PAYMENTS)
            .add_cookie(cookie.clone())
            .await
            .json();
        let payment = &payments[0];
        assert_eq!(payment["due_date"], json!(today.to_string()));
        assert_eq!(payment["status"], json!("DUE_SOON"));
        let payment_id = payment["id"].as_i64().unwrap();

        let response = server
            .post(&format_endpoint(endpoints::PAY_BILL_PAYMENT, payment_id))
            .add_cookie(cookie.clone())
            .json(&json!({ "bank_id": data.bank_id }))
            .await;
        response.assert_status_ok();
        let paid: Value = response.json();
        assert_eq!(paid["payment"]["status"], json!("PAID"));
        assert_eq!(paid["payment"]["paid_amount"], json!(80.0));
        assert_eq!(paid["transaction"]["amount"], json!(80.0));
        assert_eq!(paid["transaction"]["type"], json!("EXPENSE"));
        assert_eq!(
            paid["transaction"]["description"],
            json!("Bill payment: Internet")
        );

        let response = server
            .post(&format_endpoint(endpoints::PAY_BILL_PAYMENT, payment_id))
            .add_cookie(cookie.clone())
            .json(&json!({ "bank_id": data.bank_id }))
            .await;
        assert_error_response(&response, StatusCode::CONFLICT);

        let response = server
            .post(&format_endpoint(endpoints::UNPAY_BILL_PAYMENT, payment_id))
            .add_cookie(cookie.clone())
            .json(&json!({}))
            .await;
        response.assert_status_ok();
        let unpaid: Value = response.json();
        assert_eq!(unpaid["status"], json!("UPCOMING"));
        assert_eq!(unpaid["transaction_id"], Value::Null);

        let transactions: Value = server
            .get(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(transactions, json!([]));
    }

    #[tokio::test]
    async fn deactivated_bill_gets_no_payments() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);
        let cookie = session_cookie(data.user_id);
        let today = local_today("Etc/UTC").unwrap();

        let bill: Value = server
            .post(endpoints::BILLS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "name": "Gym",
                "amount": 25.0,
                "category_id": data.category_id,
                "frequency": "WEEKLY",
                "start_date": today.to_string(),
            }))
            .await
            .json();
        let bill_path = format_endpoint(endpoints::BILL, bill["id"].as_i64().unwrap());

        let response = server
            .patch(&bill_path)
            .add_cookie(cookie.clone())
            .json(&json!({ "is_active": false }))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["is_active"], json!(false));
        assert_eq!(updated["name"], json!("Gym"));

        let fetched: Value = server
            .get(&bill_path)
            .add_cookie(cookie.clone())
            .await
            .json();
        assert_eq!(fetched, updated);

        let refresh: Value = server
            .post(endpoints::REFRESH_BILL_PAYMENTS)
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(refresh["created"], json!(0));
    }

    #[tokio::test]
    async fn updating_missing_bill_is_not_found() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);

        let response = server
            .patch(&format_endpoint(endpoints::BILL, 999))
            .add_cookie(session_cookie(data.user_id))
            .json(&json!({ "is_active": false }))
            .await;

        assert_error_response(&response, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn created_records_can_be_fetched_from_their_location() {
        let (conn, data) = get_test_data();
        let server = get_test_server(conn);
        let cookie = session_cookie(data.user_id);

        let requests = [
            (
                endpoints::BUDGETS,
                endpoints::BUDGET,
                json!({
                    "category_id": data.category_id,
                    "period": "MONTHLY",
                    "amount": 400.0,
                    "start_date": "2025-01-01",
                }),
            ),
            (
                endpoints::LABELS,
                endpoints::LABEL,
                json!({ "name": "Holiday" }),
            ),
            (
                endpoints::TRANSACTIONS,
                endpoints::TRANSACTION,
                json!({
                    "amount": 12.5,
                    "type": "EXPENSE",
                    "bank_id": data.bank_id,
                    "date": "2025-03-01",
                    "description": "Coffee beans",
                }),
            ),
        ];

        for (collection, item, body) in requests {
            let response = server
                .post(collection)
                .add_cookie(cookie.clone())
                .json(&body)
                .await;
            response.assert_status(StatusCode::CREATED);
            let created: Value = response.json();
            let path = location(&response);
            assert_eq!(path, format_endpoint(item, created["id"].as_i64().unwrap()));

            let response = server.get(&path).add_cookie(cookie.clone()).await;

            response.assert_status_ok();
            response.assert_json(&created);
        }
    }

    #[tokio::test]
    async fn other_users_budget_is_not_found() {
        let (conn, data) = get_test_data();
        let other_user = crate::user::create_user("Other", &conn).unwrap();
        let server = get_test_server(conn);

        let budget: Value = server
            .post(endpoints::BUDGETS)
            .add_cookie(session_cookie(data.user_id))
            .json(&json!({
                "category_id": data.category_id,
                "period": "WEEKLY",
                "amount": 50.0,
                "start_date": "2025-01-01",
            }))
            .await
            .json();
        let budget_id = budget["id"].as_i64().unwrap();

        let response = server
            .get(&format_endpoint(endpoints::BUDGET, budget_id))
            .add_cookie(session_cookie(other_user.id))
            .await;

        assert_error_response(&response, StatusCode::NOT_FOUND);
    }
}
