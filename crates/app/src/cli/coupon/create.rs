use std::sync::Arc;

use clap::Args;
use jiff::Timestamp;
use uuid::Uuid;
use vouchers::usage::UsageType;
use vouchers_app::{
    database::{self, Db},
    domain::{
        coupons::{
            CouponsService, PgCouponsService,
            data::{CouponCodes, NewCoupon},
            records::CouponUuid,
        },
        scope::RequestScope,
        tenants::records::TenantUuid,
    },
    notifications::{EmailSubjects, LogNotifier},
};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Tenant owning the coupon
    #[arg(long, env = "TENANT_UUID")]
    tenant_uuid: Uuid,

    /// Coupon title
    #[arg(long)]
    title: String,

    /// SINGLE_USE, MULTI_USE, ONCE_PER_CUSTOMER or MULTI_USE_PER_CUSTOMER
    #[arg(long, default_value = "SINGLE_USE")]
    usage_type: UsageType,

    /// Uses per code; unlimited for multi-use types when omitted
    #[arg(long)]
    max_uses: Option<u32>,

    /// Number of random codes to generate
    #[arg(long, default_value_t = 1, conflicts_with = "code")]
    quantity: u32,

    /// Explicit code; repeat for several
    #[arg(long)]
    code: Vec<String>,

    /// Only learners holding an assignment may redeem
    #[arg(long)]
    requires_assignment: bool,

    /// Start of the redemption window (RFC 3339); now when omitted
    #[arg(long)]
    start_at: Option<Timestamp>,

    /// End of the redemption window (RFC 3339)
    #[arg(long)]
    end_at: Timestamp,

    /// PostgreSQL connection string for the app role
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(
        Db::new(pool),
        Arc::new(LogNotifier),
        EmailSubjects::default(),
    );

    let codes = if args.code.is_empty() {
        CouponCodes::Generate {
            quantity: args.quantity,
        }
    } else {
        CouponCodes::Explicit(args.code)
    };

    let scope = RequestScope::new(TenantUuid::from_uuid(args.tenant_uuid)).with_actor("cli");

    let coupon = service
        .create_coupon(
            scope,
            NewCoupon {
                uuid: CouponUuid::new(),
                title: args.title,
                usage_type: args.usage_type,
                max_uses: args.max_uses,
                requires_assignment: args.requires_assignment,
                start_at: args.start_at.unwrap_or_else(Timestamp::now),
                end_at: args.end_at,
                codes,
            },
        )
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("usage_type: {}", coupon.usage_type);
    println!("voucher_count: {}", coupon.voucher_count);

    Ok(())
}
