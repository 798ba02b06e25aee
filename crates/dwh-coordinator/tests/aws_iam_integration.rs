//! IAM integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_iam_integration -- --ignored
//! ```

use dwh_common::defaults::S3_READ_ONLY_POLICY_ARN;
use dwh_coordinator::aws::error::{is_already_exists, is_not_found};
use dwh_coordinator::aws::{AwsContext, FromAwsContext, IamClient, RoleGrant};
use dwh_test_utils::aws::{get_test_region, test_role_name};

/// Role lifecycle: create, re-create, attach, detach, delete
#[tokio::test]
#[ignore]
async fn test_role_lifecycle() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let iam = IamClient::from_context(&ctx);
    let role_name = test_role_name();
    let grant = RoleGrant::for_warehouse(&role_name);

    iam.create_role(&grant, "dwh-integration-test")
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");

    let again = iam
        .create_role(&grant, "dwh-integration-test")
        .await
        .expect_err("second create should conflict");
    assert!(is_already_exists(&again), "unexpected error: {again:#}");

    iam.attach_role_policy(&role_name, S3_READ_ONLY_POLICY_ARN)
        .await
        .expect("Should attach policy");
    iam.attach_role_policy(&role_name, S3_READ_ONLY_POLICY_ARN)
        .await
        .expect("Attaching twice should be a no-op");

    let arn = iam.get_role_arn(&role_name).await.expect("Should get ARN");
    assert!(arn.ends_with(&format!(":role/{role_name}")), "got {arn}");

    iam.detach_role_policy(&role_name, S3_READ_ONLY_POLICY_ARN)
        .await
        .expect("Should detach policy");
    iam.delete_role(&role_name).await.expect("Should delete role");

    let gone = iam
        .get_role_arn(&role_name)
        .await
        .expect_err("role should be gone");
    assert!(is_not_found(&gone), "unexpected error: {gone:#}");
}
