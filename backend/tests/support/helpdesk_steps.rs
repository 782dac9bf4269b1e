//! Steps shared by the helpdesk behaviour suites.

use actix_web::http::Method;
use helpdesk::domain::{DEMO_ACCOUNTS, DEMO_PASSWORD};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use crate::harness::{
    STUDENT_PASSWORD, SharedWorld, StepBody, StepRequest, WorldFixture, last_body, last_status,
    send, student_email,
};

fn demo_email(persona: &str) -> &'static str {
    let prefix = format!("{persona}@");
    DEMO_ACCOUNTS
        .iter()
        .find(|account| account.email.starts_with(&prefix))
        .map(|account| account.email)
        .expect("known demo persona")
}

pub(crate) fn seed_demo_accounts(world: &SharedWorld) {
    send(
        world,
        StepRequest {
            persona: None,
            method: Method::POST,
            path: "/functions/v1/seed-demo-accounts".to_owned(),
            body: StepBody::Empty,
        },
    );
}

pub(crate) fn sign_in(world: &SharedWorld, persona: &str, email: &str, password: &str) -> u16 {
    send(
        world,
        StepRequest {
            persona: Some(persona),
            method: Method::POST,
            path: "/api/v1/auth/login".to_owned(),
            body: StepBody::Json(json!({ "email": email, "password": password })),
        },
    )
    .status
}

#[given("a running helpdesk server")]
fn a_running_helpdesk_server(world: &WorldFixture) {
    let _ = world;
}

#[given("the demo accounts are seeded")]
fn the_demo_accounts_are_seeded(world: &WorldFixture) {
    let world = world.world();
    seed_demo_accounts(&world);
    assert_eq!(last_status(&world), Some(200));
}

#[given("student {name} has signed up")]
fn student_has_signed_up(world: &WorldFixture, name: String) {
    let world = world.world();
    let captured = send(
        &world,
        StepRequest {
            persona: Some(&name),
            method: Method::POST,
            path: "/api/v1/auth/signup".to_owned(),
            body: StepBody::Json(json!({
                "email": student_email(&name),
                "name": name,
                "password": STUDENT_PASSWORD,
            })),
        },
    );
    assert_eq!(captured.status, 201, "signup should succeed");
}

#[given("{persona} signs in with the demo password")]
fn persona_signs_in_with_the_demo_password(world: &WorldFixture, persona: String) {
    let world = world.world();
    let status = sign_in(&world, &persona, demo_email(&persona), DEMO_PASSWORD);
    assert_eq!(status, 200, "demo login should succeed");
}

#[when("{name} opens a ticket")]
fn student_opens_a_ticket(world: &WorldFixture, name: String) {
    let world = world.world();
    let captured = send(
        &world,
        StepRequest {
            persona: Some(&name),
            method: Method::POST,
            path: "/api/v1/tickets".to_owned(),
            body: StepBody::Json(json!({
                "subject": "Cannot reach the VPN",
                "message": "It fails with error 809 since Monday.",
            })),
        },
    );
    let body = captured.body.unwrap_or(Value::Null);
    let mut ctx = world.borrow_mut();
    ctx.ticket_id = body
        .pointer("/ticket/id")
        .and_then(Value::as_str)
        .map(str::to_owned);
    ctx.opening_message_id = body
        .pointer("/message/id")
        .and_then(Value::as_str)
        .map(str::to_owned);
    ctx.last_body = body.get("ticket").cloned();
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(last_status(&world.world()), Some(status));
}

#[then("the error body carries the trace id")]
fn the_error_body_carries_the_trace_id(world: &WorldFixture) {
    let world = world.world();
    let trace_id = world.borrow().last_trace_id.clone().expect("trace id header");
    let body = last_body(&world);
    assert_eq!(
        body.get("traceId").and_then(Value::as_str),
        Some(trace_id.as_str())
    );
    assert!(body.get("code").and_then(Value::as_str).is_some());
}
