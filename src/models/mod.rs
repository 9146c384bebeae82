//! Domain models shared by the pricing, payment and staffing modules

pub mod audit;
pub mod catalog;
pub mod contract;
pub mod payment;
pub mod staffing;

pub use audit::{AuditAction, AuditEntry};
pub use catalog::{
    AdditionalOption, Catalog, DiscountKind, DiscountRule, EngagementSession, Location, Package,
    Product, ServiceType,
};
pub use contract::{
    contract_code, AdHocDiscount, Contract, ContractStatus, OvertimeEntry, ProductLine,
    Selections, ServiceSelection,
};
pub use payment::{
    Payment, PaymentMethod, PaymentPurpose, PaymentSchedule, ScheduleType, SchedulePayment,
};
pub use staffing::{
    AvailabilityRow, BookingStatus, EventStaffBooking, Role, StaffMember, StaffSlots,
};
