//! Integration tests for the network resource lifecycle using wiremock
//!
//! Each test configures a real client against mocked control plane
//! endpoints and drives the engine verbs through `dispatch`, checking the
//! identity recorded in state and the drift behavior around 404s.

use serde_json::json;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hcp_adapter::config::Config;
use hcp_adapter::hcp::client::HcpClient;
use hcp_adapter::identity::IdentityError;
use hcp_adapter::{
    configure_scope, dispatch, read_data_source, AdapterError, AttributeStore, MemoryState,
    Operation,
};

const ORG_ID: &str = "6e7a7da2-6e9f-4b11-9c7a-0f0efec9963f";
const PROJECT_A: &str = "c25bf4a7-9563-48a7-99fa-5eb48be287a0";
const PROJECT_B: &str = "4d1e28a6-2c44-4b5b-9a0f-3e1d5a3bb0e1";

/// Client with the default scope frozen to (ORG_ID, PROJECT_A) via the
/// explicit-project path.
async fn configured_client(server: &MockServer) -> HcpClient {
    Mock::given(method("GET"))
        .and(path(format!(
            "/resource-manager/2019-12-10/projects/{PROJECT_A}"
        )))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "project": {
                "id": PROJECT_A,
                "name": "default",
                "parent": { "type": "ORGANIZATION", "id": ORG_ID },
                "created_at": "2021-02-03T04:05:06Z"
            }
        })))
        .mount(server)
        .await;

    let client = HcpClient::new(&Config {
        access_token: Some("test-token".to_string()),
        project_id: Some(PROJECT_A.to_string()),
        api_host: Some(server.uri()),
        ..Default::default()
    })
    .expect("client should build");

    configure_scope(&client).await.expect("scope should configure");
    client
}

fn network_path(project_id: &str, suffix: &str) -> String {
    format!("/network/2020-09-07/organizations/{ORG_ID}/projects/{project_id}/{suffix}")
}

fn hvn_link(project_id: &str, hvn_id: &str) -> String {
    format!("/project/{project_id}/hashicorp.network.hvn/{hvn_id}")
}

fn hvn_json(id: &str, cidr: &str) -> serde_json::Value {
    json!({
        "id": id,
        "cidr_block": cidr,
        "state": "STABLE",
        "created_at": "2021-02-03T04:05:06Z",
        "location": {
            "organization_id": ORG_ID,
            "project_id": PROJECT_A,
            "region": { "provider": "aws", "region": "us-west-2" }
        }
    })
}

/// Tests for the HVN resource.
mod hvn_tests {
    use super::*;

    /// Test create recording the canonical link as the durable identity
    #[tokio::test]
    async fn test_create_records_canonical_identity() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("POST"))
            .and(path(network_path(PROJECT_A, "networks")))
            .and(bearer_token("test-token"))
            .and(body_partial_json(json!({ "network": { "id": "test-hvn" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": hvn_json("test-hvn", "172.25.16.0/20")
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new()
            .with_attr("hvn_id", "test-hvn")
            .with_attr("cloud_provider", "aws")
            .with_attr("region", "us-west-2")
            .with_attr("cidr_block", "172.25.16.0/20");

        dispatch(Operation::Create, "hcp_hvn", &client, &mut state)
            .await
            .expect("create should succeed");

        let expected_link = hvn_link(PROJECT_A, "test-hvn");
        assert_eq!(state.id().as_deref(), Some(expected_link.as_str()));
        assert_eq!(state.get("self_link").as_deref(), Some(expected_link.as_str()));
        assert_eq!(state.get("organization_id").as_deref(), Some(ORG_ID));
        assert_eq!(state.get("project_id").as_deref(), Some(PROJECT_A));
        assert_eq!(state.get("state").as_deref(), Some("STABLE"));
    }

    /// Test read refreshing computed attributes from the remote record
    #[tokio::test]
    async fn test_read_refreshes_computed_attributes() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": hvn_json("test-hvn", "10.64.0.0/16")
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        state.set_id(&hvn_link(PROJECT_A, "test-hvn"));

        dispatch(Operation::Read, "hcp_hvn", &client, &mut state)
            .await
            .expect("read should succeed");

        assert_eq!(state.get("hvn_id").as_deref(), Some("test-hvn"));
        assert_eq!(state.get("cidr_block").as_deref(), Some("10.64.0.0/16"));
        assert_eq!(state.get("cloud_provider").as_deref(), Some("aws"));
        assert_eq!(state.get("region").as_deref(), Some("us-west-2"));
    }

    /// Test a vanished remote clearing state instead of failing
    #[tokio::test]
    async fn test_read_clears_state_when_remote_is_gone() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        state.set_id(&hvn_link(PROJECT_A, "test-hvn"));
        state.set("cidr_block", "172.25.16.0/20");

        dispatch(Operation::Read, "hcp_hvn", &client, &mut state)
            .await
            .expect("drift read should succeed");

        assert_eq!(state.id(), None);
        assert_eq!(state.get("cidr_block"), None);
    }

    /// Test delete clearing state
    #[tokio::test]
    async fn test_delete_clears_state() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        state.set_id(&hvn_link(PROJECT_A, "test-hvn"));

        dispatch(Operation::Delete, "hcp_hvn", &client, &mut state)
            .await
            .expect("delete should succeed");
        assert_eq!(state.id(), None);
    }

    /// Test delete treating an already-gone remote as success
    #[tokio::test]
    async fn test_delete_tolerates_already_deleted() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("DELETE"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        state.set_id(&hvn_link(PROJECT_A, "test-hvn"));

        dispatch(Operation::Delete, "hcp_hvn", &client, &mut state)
            .await
            .expect("delete of a missing remote should succeed");
        assert_eq!(state.id(), None);
    }

    /// Test import by bare ID adopting into the default project
    #[tokio::test]
    async fn test_import_short_form_uses_default_project() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": hvn_json("test-hvn", "172.25.16.0/20")
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        dispatch(Operation::Import("test-hvn"), "hcp_hvn", &client, &mut state)
            .await
            .expect("import should succeed");

        assert_eq!(
            state.id().as_deref(),
            Some(hvn_link(PROJECT_A, "test-hvn").as_str())
        );
        assert_eq!(state.get("project_id").as_deref(), Some(PROJECT_A));
        assert_eq!(state.get("cidr_block").as_deref(), Some("172.25.16.0/20"));
    }

    /// Test the two-part import form targeting another project
    #[tokio::test]
    async fn test_import_full_form_targets_other_project() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_B, "networks/other-hvn")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": {
                    "id": "other-hvn",
                    "cidr_block": "10.64.0.0/16",
                    "state": "STABLE",
                    "location": { "organization_id": ORG_ID, "project_id": PROJECT_B }
                }
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        dispatch(
            Operation::Import(&format!("{PROJECT_B}:other-hvn")),
            "hcp_hvn",
            &client,
            &mut state,
        )
        .await
        .expect("import should succeed");

        assert_eq!(
            state.id().as_deref(),
            Some(hvn_link(PROJECT_B, "other-hvn").as_str())
        );
        assert_eq!(state.get("project_id").as_deref(), Some(PROJECT_B));
    }

    /// Test a malformed import ID aborting before any request goes out
    #[tokio::test]
    async fn test_malformed_import_makes_no_request() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;
        let requests_before = server.received_requests().await.unwrap().len();

        let mut state = MemoryState::new();
        let err = dispatch(Operation::Import("a:b:c"), "hcp_hvn", &client, &mut state)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AdapterError::Identity(IdentityError::MalformedId { .. })
        ));
        assert!(state.id().is_none());
        let requests_after = server.received_requests().await.unwrap().len();
        assert_eq!(requests_before, requests_after);
    }
}

/// Tests for the HVN peering resource.
mod peering_tests {
    use super::*;

    /// Test create posting under the source HVN with the target's own
    /// project in the payload
    #[tokio::test]
    async fn test_create_posts_under_source_hvn() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("POST"))
            .and(path(network_path(PROJECT_A, "networks/hvn-1/peerings")))
            .and(body_partial_json(json!({
                "peering": {
                    "id": "peer-1",
                    "target": {
                        "hvn_target": {
                            "hvn": { "id": "hvn-2", "location": { "project_id": PROJECT_B } }
                        }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "peering": {
                    "id": "peer-1",
                    "state": "ACTIVE",
                    "created_at": "2022-06-01T00:00:00Z",
                    "hvn": {
                        "id": "hvn-1",
                        "location": { "organization_id": ORG_ID, "project_id": PROJECT_A }
                    },
                    "target": {
                        "hvn_target": {
                            "hvn": {
                                "id": "hvn-2",
                                "location": { "organization_id": ORG_ID, "project_id": PROJECT_B }
                            }
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new()
            .with_attr("peering_id", "peer-1")
            .with_attr("hvn_1", &hvn_link(PROJECT_A, "hvn-1"))
            .with_attr("hvn_2", &hvn_link(PROJECT_B, "hvn-2"));

        dispatch(
            Operation::Create,
            "hcp_hvn_peering_connection",
            &client,
            &mut state,
        )
        .await
        .expect("create should succeed");

        assert_eq!(
            state.id().as_deref(),
            Some(format!("/project/{PROJECT_A}/hashicorp.network.peering/peer-1").as_str())
        );
        assert_eq!(state.get("state").as_deref(), Some("ACTIVE"));
        // Link attributes are rebuilt from the response pointers.
        assert_eq!(
            state.get("hvn_2").as_deref(),
            Some(hvn_link(PROJECT_B, "hvn-2").as_str())
        );
    }

    /// Test importing by the three-part composite form
    #[tokio::test]
    async fn test_import_full_composite() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(
                PROJECT_B,
                "networks/hvn-9/peerings/peer-9",
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "peering": {
                    "id": "peer-9",
                    "state": "ACTIVE",
                    "hvn": {
                        "id": "hvn-9",
                        "location": { "organization_id": ORG_ID, "project_id": PROJECT_B }
                    }
                }
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        dispatch(
            Operation::Import(&format!("{PROJECT_B}:hvn-9:peer-9")),
            "hcp_hvn_peering_connection",
            &client,
            &mut state,
        )
        .await
        .expect("import should succeed");

        assert_eq!(
            state.id().as_deref(),
            Some(format!("/project/{PROJECT_B}/hashicorp.network.peering/peer-9").as_str())
        );
        assert_eq!(
            state.get("hvn_1").as_deref(),
            Some(hvn_link(PROJECT_B, "hvn-9").as_str())
        );
        assert_eq!(state.get("peering_id").as_deref(), Some("peer-9"));
    }
}

/// Tests for the HVN route resource.
mod route_tests {
    use super::*;

    /// Test create taking the target connection type from its link URL
    #[tokio::test]
    async fn test_create_takes_target_type_from_url() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("POST"))
            .and(path(network_path(PROJECT_A, "networks/hvn-1/routes")))
            .and(body_partial_json(json!({
                "route": {
                    "id": "route-1",
                    "destination_cidr": "10.0.0.0/8",
                    "target": {
                        "hvn_connection": {
                            "type": "hashicorp.network.peering",
                            "id": "peer-1"
                        }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "route": {
                    "id": "route-1",
                    "destination_cidr": "10.0.0.0/8",
                    "state": "STABLE",
                    "created_at": "2022-06-01T00:00:00Z"
                }
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new()
            .with_attr("hvn_route_id", "route-1")
            .with_attr("hvn_link", &hvn_link(PROJECT_A, "hvn-1"))
            .with_attr("destination_cidr", "10.0.0.0/8")
            .with_attr(
                "target_link",
                &format!("/project/{PROJECT_A}/hashicorp.network.peering/peer-1"),
            );

        dispatch(Operation::Create, "hcp_hvn_route", &client, &mut state)
            .await
            .expect("create should succeed");

        assert_eq!(
            state.id().as_deref(),
            Some(format!("/project/{PROJECT_A}/hashicorp.network.route/route-1").as_str())
        );
        assert_eq!(state.get("destination_cidr").as_deref(), Some("10.0.0.0/8"));
    }

    /// Test importing by the two-part composite form under the default
    /// project
    #[tokio::test]
    async fn test_import_short_composite() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(
                PROJECT_A,
                "networks/hvn-1/routes/route-1",
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "route": {
                    "id": "route-1",
                    "destination_cidr": "10.0.0.0/8",
                    "state": "STABLE"
                }
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new();
        dispatch(
            Operation::Import("hvn-1:route-1"),
            "hcp_hvn_route",
            &client,
            &mut state,
        )
        .await
        .expect("import should succeed");

        assert_eq!(
            state.get("hvn_link").as_deref(),
            Some(hvn_link(PROJECT_A, "hvn-1").as_str())
        );
        assert_eq!(state.get("hvn_route_id").as_deref(), Some("route-1"));
        assert_eq!(state.get("destination_cidr").as_deref(), Some("10.0.0.0/8"));
    }
}

/// Tests for the HVN data source.
mod data_source_tests {
    use super::*;

    /// Test the data source publishing the record found by ID
    #[tokio::test]
    async fn test_data_source_reads_by_id() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_A, "networks/test-hvn")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": hvn_json("test-hvn", "172.25.16.0/20")
            })))
            .mount(&server)
            .await;

        let mut state = MemoryState::new().with_attr("hvn_id", "test-hvn");
        read_data_source("hcp_hvn", &client, &mut state)
            .await
            .expect("data source read should succeed");

        assert_eq!(
            state.get("self_link").as_deref(),
            Some(hvn_link(PROJECT_A, "test-hvn").as_str())
        );
        assert_eq!(state.get("cidr_block").as_deref(), Some("172.25.16.0/20"));
    }

    /// Test a missing remote being a hard error for the data source,
    /// unlike resource reads
    #[tokio::test]
    async fn test_data_source_missing_remote_is_fatal() {
        let server = MockServer::start().await;
        let client = configured_client(&server).await;

        Mock::given(method("GET"))
            .and(path(network_path(PROJECT_A, "networks/ghost")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut state = MemoryState::new().with_attr("hvn_id", "ghost");
        let err = read_data_source("hcp_hvn", &client, &mut state)
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::Api(ref api) if api.is_not_found()));
    }
}
