//! RPC-style signing: the signature covers every parameter and travels in the
//! query string.

use super::{format_iso8601, percent_encode, prepare, signing_secret, SigningContext, Signer};
use crate::credentials::Credential;
use crate::error::AcsError;
use crate::request::ResolvedRequest;
use crate::transport::HttpRequest;
use std::collections::BTreeMap;

/// Sorted, percent-encoded `k=v` pairs joined with `&`.
pub fn canonicalized_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the RPC string to sign.
///
/// Format: `METHOD&%2F&percentEncode(canonicalizedQuery)`
pub fn rpc_string_to_sign(method: &str, params: &BTreeMap<String, String>) -> String {
    format!(
        "{}&{}&{}",
        method,
        percent_encode("/"),
        percent_encode(&canonicalized_query(params))
    )
}

pub(super) fn sign(
    resolved: &ResolvedRequest<'_>,
    signer: &dyn Signer,
    credential: &Credential,
    ctx: &SigningContext,
) -> Result<HttpRequest, AcsError> {
    let request = resolved.request;
    let mut query = request.query_params().clone();

    let mut put = |key: &str, value: &str| {
        query.insert(key.to_string(), value.to_string());
    };
    put("Format", resolved.format.as_str());
    put("RegionId", &resolved.region_id);
    put("Version", request.version());
    put("Action", request.action());
    put("SignatureMethod", signer.name());
    put("SignatureVersion", signer.version());
    put("SignatureNonce", &ctx.nonce);
    put("Timestamp", &format_iso8601(&ctx.timestamp));
    if let Some(signature_type) = signer.signer_type() {
        put("SignatureType", signature_type);
    }

    match credential {
        Credential::AccessKey { access_key_id, .. } => put("AccessKeyId", access_key_id),
        Credential::StsToken { access_key_id, .. } => {
            put("AccessKeyId", access_key_id);
            put("SecurityToken", credential.security_token().unwrap_or_default());
        }
        Credential::BearerToken { .. } => {
            put("BearerToken", credential.bearer_token_value().unwrap_or_default());
        }
    }

    // Domain parameters are signed but sent in the body.
    let mut signed = query.clone();
    signed.extend(
        request
            .domain_params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let string_to_sign = rpc_string_to_sign(resolved.method.as_str(), &signed);
    let signature = signer.sign(&string_to_sign, &signing_secret(credential))?;
    if !signature.is_empty() {
        query.insert("Signature".to_string(), signature);
    }

    let url = format!(
        "{}://{}/?{}",
        request.protocol().scheme(),
        resolved.domain,
        canonicalized_query(&query)
    );

    Ok(prepare(resolved, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AcsRequest;
    use crate::signing::{BearerTokenSigner, HmacSha1Signer};
    use crate::types::{Format, HttpMethod};
    use chrono::{TimeZone, Utc};

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn context() -> SigningContext {
        SigningContext::new(
            Utc.with_ymd_and_hms(2016, 2, 23, 12, 46, 24).unwrap(),
            "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf",
        )
    }

    fn resolve(request: &AcsRequest, method: HttpMethod) -> ResolvedRequest<'_> {
        ResolvedRequest {
            request,
            method,
            region_id: "cn-hangzhou".to_string(),
            format: Format::Json,
            domain: "ecs.aliyuncs.com".to_string(),
        }
    }

    #[test]
    fn test_documented_describe_regions_signature() {
        let params = params(&[
            ("AccessKeyId", "testid"),
            ("Action", "DescribeRegions"),
            ("Format", "XML"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf"),
            ("SignatureVersion", "1.0"),
            ("Timestamp", "2016-02-23T12:46:24Z"),
            ("Version", "2014-05-26"),
        ]);

        let string_to_sign = rpc_string_to_sign("GET", &params);
        assert_eq!(
            string_to_sign,
            "GET&%2F&AccessKeyId%3Dtestid%26Action%3DDescribeRegions%26Format%3DXML\
             %26SignatureMethod%3DHMAC-SHA1%26SignatureNonce%3D3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf\
             %26SignatureVersion%3D1.0%26Timestamp%3D2016-02-23T12%253A46%253A24Z%26Version%3D2014-05-26"
        );

        let signature = HmacSha1Signer.sign(&string_to_sign, "testsecret&").unwrap();
        assert_eq!(signature, "OLeaidS1JvxuMvnyHOwuJ+uX5qY=");
    }

    #[test]
    fn test_canonicalized_query_sorts_and_encodes() {
        let params = params(&[("b", "x y"), ("a", "1*2"), ("c", "~")]);
        assert_eq!(canonicalized_query(&params), "a=1%2A2&b=x%20y&c=~");
    }

    #[test]
    fn test_sign_adds_system_parameters() {
        let request = AcsRequest::rpc("Ecs", "2014-05-26", "DescribeRegions")
            .with_query_param("PageSize", "10");
        let credential = Credential::sts_token("STS.id", "secret", "token");

        let http = sign(&resolve(&request, HttpMethod::Get), &HmacSha1Signer, &credential, &context())
            .unwrap();

        assert!(http.url.starts_with("https://ecs.aliyuncs.com/?"));
        assert_eq!(http.method, "GET");
        assert_eq!(http.query_param("Action").as_deref(), Some("DescribeRegions"));
        assert_eq!(http.query_param("Format").as_deref(), Some("JSON"));
        assert_eq!(http.query_param("RegionId").as_deref(), Some("cn-hangzhou"));
        assert_eq!(http.query_param("Version").as_deref(), Some("2014-05-26"));
        assert_eq!(http.query_param("PageSize").as_deref(), Some("10"));
        assert_eq!(http.query_param("AccessKeyId").as_deref(), Some("STS.id"));
        assert_eq!(http.query_param("SecurityToken").as_deref(), Some("token"));
        assert_eq!(http.query_param("Timestamp").as_deref(), Some("2016-02-23T12:46:24Z"));
        assert_eq!(
            http.query_param("SignatureNonce").as_deref(),
            Some("3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf")
        );
        assert_eq!(http.get_header("Accept"), Some("application/json"));
        assert!(http.body.is_none());
    }

    #[test]
    fn test_signature_covers_query_and_domain_params() {
        let request = AcsRequest::rpc("Ecs", "2014-05-26", "CreateInstance")
            .with_domain_param("InstanceName", "web");
        let credential = Credential::access_key("id", "secret");

        let http = sign(&resolve(&request, HttpMethod::Post), &HmacSha1Signer, &credential, &context())
            .unwrap();

        let expected = params(&[
            ("AccessKeyId", "id"),
            ("Action", "CreateInstance"),
            ("Format", "JSON"),
            ("InstanceName", "web"),
            ("RegionId", "cn-hangzhou"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf"),
            ("SignatureVersion", "1.0"),
            ("Timestamp", "2016-02-23T12:46:24Z"),
            ("Version", "2014-05-26"),
        ]);
        let expected_signature = HmacSha1Signer
            .sign(&rpc_string_to_sign("POST", &expected), "secret&")
            .unwrap();

        assert_eq!(http.query_param("Signature"), Some(expected_signature));
        assert!(http.query_param("InstanceName").is_none());
        assert_eq!(
            http.get_header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(http.body.as_deref(), Some(&b"InstanceName=web"[..]));
    }

    #[test]
    fn test_bearer_token_is_not_signed() {
        let request = AcsRequest::rpc("Ecs", "2014-05-26", "DescribeRegions");
        let credential = Credential::bearer_token("bearer");

        let http = sign(&resolve(&request, HttpMethod::Get), &BearerTokenSigner, &credential, &context())
            .unwrap();

        assert_eq!(http.query_param("BearerToken").as_deref(), Some("bearer"));
        assert_eq!(http.query_param("SignatureType").as_deref(), Some("BEARERTOKEN"));
        assert!(http.query_param("AccessKeyId").is_none());
        assert!(http.query_param("Signature").is_none());
    }
}
