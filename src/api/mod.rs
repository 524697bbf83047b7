pub mod builder;
pub mod client;
pub mod response;
pub mod types;

pub use builder::AnyPayBuilder;
pub use client::AnyPayClient;
pub use types::{
    Balance, CommissionType, Commissions, IpNotification, Payment, PaymentList, PaymentStatus,
    PaymentsFilter, PayoutRequest, PayoutResult, PayoutStatus, Rates,
};
