//! Mock implementations for testing.
//!
//! [`MockTransport`] stands in for the network and records every request it
//! receives; [`TestFixtures`] builds the profiles, requests and bodies the
//! tests share.

mod signer;
mod transport;

pub use signer::{MockSigner, MOCK_SIGNATURE};
pub use transport::{MockResponse, MockTransport};

use crate::credentials::Credential;
use crate::profile::Profile;
use crate::request::AcsRequest;

/// Test fixtures for Open API calls.
pub struct TestFixtures;

impl TestFixtures {
    /// Region used by [`profile`](Self::profile).
    pub const REGION_ID: &'static str = "cn-hangzhou";

    /// Access key credential used by the fixtures.
    pub fn credential() -> Credential {
        Credential::access_key("test-access-key-id", "test-access-key-secret")
    }

    /// Profile for `cn-hangzhou` with JSON format and HMAC-SHA1.
    pub fn profile() -> Profile {
        Profile::new(Self::REGION_ID, Self::credential())
    }

    /// ECS `DescribeRegions` (RPC).
    pub fn describe_regions() -> AcsRequest {
        AcsRequest::rpc("Ecs", "2014-05-26", "DescribeRegions")
    }

    /// ECS `DescribeInstances` for one page (RPC).
    pub fn describe_instances(page: u32) -> AcsRequest {
        AcsRequest::rpc("Ecs", "2014-05-26", "DescribeInstances")
            .with_query_param("PageNumber", page.to_string())
    }

    /// Container Service `DescribeClusterDetail` (ROA).
    pub fn describe_cluster(cluster_id: &str) -> AcsRequest {
        AcsRequest::roa("CS", "2015-12-15", "DescribeClusterDetail", "/clusters/[ClusterId]")
            .with_path_param("ClusterId", cluster_id)
    }

    /// JSON body of a successful `DescribeRegions` call.
    pub fn regions_json() -> &'static str {
        r#"{
  "RequestId": "6C5A3D2B-B5A6-4D6B-9F6D-7E9C0A1B2C3D",
  "Regions": {
    "Region": [
      {"RegionId": "cn-hangzhou", "LocalName": "华东 1"},
      {"RegionId": "cn-beijing", "LocalName": "华北 2"}
    ]
  }
}"#
    }

    /// XML body of a successful `DescribeRegions` call.
    pub fn regions_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeRegionsResponse>
    <RequestId>6C5A3D2B-B5A6-4D6B-9F6D-7E9C0A1B2C3D</RequestId>
    <Regions>
        <Region>
            <RegionId>cn-hangzhou</RegionId>
        </Region>
        <Region>
            <RegionId>cn-beijing</RegionId>
        </Region>
    </Regions>
</DescribeRegionsResponse>"#
    }

    /// JSON error body.
    pub fn error_json(code: &str, message: &str, request_id: &str) -> String {
        format!(
            r#"{{"RequestId":"{}","HostId":"ecs.aliyuncs.com","Code":"{}","Message":"{}"}}"#,
            request_id, code, message
        )
    }

    /// XML error body.
    pub fn error_xml(code: &str, message: &str, request_id: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
    <RequestId>{}</RequestId>
    <HostId>ecs.aliyuncs.com</HostId>
    <Code>{}</Code>
    <Message>{}</Message>
</Error>"#,
            request_id, code, message
        )
    }
}
