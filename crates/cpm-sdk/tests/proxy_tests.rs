//! Proxy handling. Kept in its own test binary because the proxy comes from
//! process-wide environment variables, which reqwest reads once per process.

use cpm_sdk::*;
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn test_use_proxy_selects_route() {
    let mut appliance = Server::new_async().await;
    let mut proxy = Server::new_async().await;

    for var in ["HTTP_PROXY", "http_proxy"] {
        std::env::set_var(var, proxy.url());
    }
    for var in ["NO_PROXY", "no_proxy"] {
        std::env::set_var(var, "");
    }

    let proxied = proxy
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(json!({"via": "proxy"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let direct = appliance
        .mock("GET", "/api/v2/config/serialportsaction")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"via": "appliance"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let params = SerialPortActionInfoParams::new(appliance.host_with_port(), "super").with_username("super");

    let through_proxy = serial_port_action_info(params.clone().with_proxy(true)).await.unwrap();
    assert_eq!(through_proxy.data, json!({"via": "proxy"}));

    let bypassing_proxy = serial_port_action_info(params.with_proxy(false)).await.unwrap();
    assert_eq!(bypassing_proxy.data, json!({"via": "appliance"}));

    proxied.assert_async().await;
    direct.assert_async().await;
}
