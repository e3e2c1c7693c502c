//! Environment stack: the image resizing application
//!
//! Web instances accept resize requests and queue them; worker instances
//! consume the queue. Both track requests in one table, store images in one
//! bucket, and register with the deployment server from the operations stack.

use cirrus_core::builder::{BuildError, TemplateBuilder};
use cirrus_core::resource::{Output, Parameter, ParameterType, Resource};
use cirrus_core::value::{Pseudo, Value};
use cirrus_provider_aws::dynamodb::{ProvisionedThroughput, ScalarType, Table};
use cirrus_provider_aws::ec2::{Instance, IngressRule, RuleSource, SecurityGroup};
use cirrus_provider_aws::iam::{InstanceProfile, Policy, PolicyDocument, Principal, Role, Statement};
use cirrus_provider_aws::s3::{Bucket, BucketPolicy};
use cirrus_provider_aws::sqs::Queue;

use super::bootstrap::{TentacleRegistration, tentacle_init, tentacle_user_data};
use super::region_map;

const BUCKET: &str = "AtScaleImages";
const TABLE: &str = "AtScaleResizeRequests";
const QUEUE: &str = "AtScaleImagesResizeQueue";
const TENTACLE_PORT: u16 = 10933;

/// One tier of instances: role, profile, security group and a single instance
struct Tier {
    prefix: &'static str,
    instance: &'static str,
    group_description: &'static str,
    tentacle_role: &'static str,
    queue_actions: &'static [&'static str],
    bucket_actions: &'static [&'static str],
    /// Ports open to the internet besides the tentacle port
    public_ports: &'static [u16],
}

const WEB: Tier = Tier {
    prefix: "AtScaleWeb",
    instance: "Web1",
    group_description: "Security group for AtScale web instances",
    tentacle_role: "web-server",
    queue_actions: &["sqs:SendMessage"],
    bucket_actions: &["s3:PutObject"],
    public_ports: &[8080, 3389],
};

const WORKER: Tier = Tier {
    prefix: "AtScaleWorker",
    instance: "Worker1",
    group_description: "Security group for AtScale worker instances",
    tentacle_role: "worker-server",
    queue_actions: &["sqs:ReceiveMessage", "sqs:DeleteMessage"],
    bucket_actions: &["s3:PutObject", "s3:GetObject"],
    public_ports: &[],
};

pub fn declare(builder: &mut TemplateBuilder) -> Result<(), BuildError> {
    declare_parameters(builder)?;
    builder.declare_mapping(region_map())?;
    declare_storage(builder)?;

    declare_tier(builder, &WEB)?;
    builder.declare_output(
        Output::new(
            "URL",
            Value::join(
                "",
                [
                    Value::from("http://"),
                    Value::get_att(WEB.instance, "PublicDnsName"),
                ],
            ),
        )
        .with_description("URL of AtScale"),
    )?;
    declare_tier(builder, &WORKER)
}

fn declare_parameters(builder: &mut TemplateBuilder) -> Result<(), BuildError> {
    let parameters = [
        (
            "KeyName",
            "Name of an existing EC2 KeyPair to enable RDP access to the instance",
        ),
        ("OctopusMasterUrl", "URL of the Octopus Master"),
        ("OctopusThumbprint", "Thumbprint of the Octopus Deploy Server"),
        ("OctopusApiKey", "API key to use with the Octopus Deploy Server"),
        (
            "OctopusSecurityGroupId",
            "Id of the security group that the Octopus Master is attached to",
        ),
    ];
    for (name, description) in parameters {
        builder.declare_parameter(
            Parameter::new(name, ParameterType::String)
                .with_description(description)
                .with_no_echo(name == "OctopusApiKey"),
        )?;
    }
    Ok(())
}

fn declare_storage(builder: &mut TemplateBuilder) -> Result<(), BuildError> {
    builder.declare_resource(Resource::from_kind(BUCKET, Bucket::new()))?;
    builder.declare_resource(Resource::from_kind(
        "AtScaleImagesPolicy",
        BucketPolicy::new(
            Value::reference(BUCKET),
            PolicyDocument::new().with_statement(
                Statement::allow("s3:GetObject")
                    .with_sid("AllowPublicRead")
                    .with_principal(Principal::Aws("*".into()))
                    .with_resource(Value::join(
                        "",
                        [
                            Value::from("arn:aws:s3:::"),
                            Value::reference(BUCKET),
                            Value::from("/output*"),
                        ],
                    )),
            ),
        ),
    ))?;
    builder.declare_output(
        Output::new("ImageBucketDomainName", Value::get_att(BUCKET, "DomainName"))
            .with_description("Domain name of the AtScale image bucket"),
    )?;

    builder.declare_resource(Resource::from_kind(
        TABLE,
        Table::with_hash_key("ImageId", ScalarType::String, ProvisionedThroughput::new(3, 1)),
    ))?;

    builder.declare_resource(Resource::from_kind(QUEUE, Queue::new()))?;
    builder.declare_output(
        Output::new("ResizeQueueName", Value::get_att(QUEUE, "QueueName"))
            .with_description("SQS queue name of our image resize requests"),
    )?;
    Ok(())
}

/// Policy granting a tier access to the queue, table and bucket
fn access_policy(tier: &Tier) -> Policy {
    // The table is addressed by ARN built from the stack's region and account
    let table_arn = Value::join(
        ":",
        [
            Value::from("arn:aws:dynamodb"),
            Value::from(Pseudo::Region),
            Value::from(Pseudo::AccountId),
            Value::from(format!("table/{}", TABLE)),
        ],
    );
    Policy::new(
        "AccessDynamoDbSqsAndS3",
        PolicyDocument::new()
            .with_statement(Statement::allow_all(
                tier.queue_actions.iter().copied(),
                [Value::get_att(QUEUE, "Arn")],
            ))
            .with_statement(Statement::allow_all(
                [
                    "dynamodb:GetItem",
                    "dynamodb:PutItem",
                    "dynamodb:Query",
                    "dynamodb:UpdateItem",
                ],
                [table_arn],
            ))
            .with_statement(Statement::allow_all(
                tier.bucket_actions.iter().copied(),
                [format!("arn:aws:s3:::{}", BUCKET)],
            )),
    )
}

fn declare_tier(builder: &mut TemplateBuilder, tier: &Tier) -> Result<(), BuildError> {
    let role = format!("{}Role", tier.prefix);
    let profile = format!("{}InstanceProfile", tier.prefix);
    let group = format!("{}Sg", tier.prefix);

    builder.declare_resource(Resource::from_kind(
        role.as_str(),
        Role::for_ec2().with_path("/").with_policy(access_policy(tier)),
    ))?;
    builder.declare_resource(Resource::from_kind(
        profile.as_str(),
        InstanceProfile::for_role(Value::reference(role.as_str())).with_path("/"),
    ))?;

    let mut security_group = SecurityGroup::new(tier.group_description);
    for port in tier.public_ports {
        security_group = security_group
            .with_ingress(IngressRule::tcp(*port, RuleSource::Cidr("0.0.0.0/0".to_string())));
    }
    // Listening tentacle, reachable only from the deployment server
    security_group = security_group.with_ingress(IngressRule::tcp(
        TENTACLE_PORT,
        RuleSource::SecurityGroupId(Value::reference("OctopusSecurityGroupId")),
    ));
    builder.declare_resource(Resource::from_kind(group.as_str(), security_group))?;

    let registration = TentacleRegistration {
        server_url: "OctopusMasterUrl",
        api_key: "OctopusApiKey",
        thumbprint: "OctopusThumbprint",
        role: tier.tentacle_role,
        environment: "Dev",
    };
    builder.declare_resource(
        Resource::from_kind(
            tier.instance,
            Instance::new(
                Value::find_in_map("RegionMap", Pseudo::Region, "AMI"),
                "t1.micro",
            )
            .with_key_name(Value::reference("KeyName"))
            .with_security_group(Value::reference(group.as_str()))
            .with_iam_instance_profile(Value::reference(profile.as_str()))
            .with_user_data(tentacle_user_data(tier.instance, &registration)),
        )
        .with_metadata(tentacle_init()),
    )?;
    Ok(())
}
