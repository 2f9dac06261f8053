mod bid;
mod lifecycle;
mod location;
mod role;
mod route;
mod service_request;

pub use bid::{Bid, Status as BidStatus};
pub use lifecycle::{LifecycleEvent, LifecycleEventKind};
pub use location::{Coordinates, Location};
pub use role::Role;
pub use route::RouteGeometry;
pub use service_request::{
    Rating, ServiceRequest, Status as RequestStatus, Transition, Urgency,
};
