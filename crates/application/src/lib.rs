//! Application services and ports for metadata-driven CRUD frontends.

#![forbid(unsafe_code)]

mod crud_service;
mod form_service;
mod ports;
mod route_map;
mod submission_decoder;
mod table_service;

pub use crud_service::{
    ConfirmModel, CrudService, DetailModel, FormVerb, FormView, RelationshipTable, SubmitOutcome,
};
pub use form_service::{FormFieldEntry, FormModel, FormService, LinkableEntry, SelectedLink};
pub use ports::{
    GatewayFailure, GatewayRejection, GatewayResult, LinkCandidate, LinkSource, PolicyEvaluator,
    ResourceGateway,
};
pub use route_map::{ActionRouteMap, GatewayOperation, RoutePlan};
pub use submission_decoder::{
    DATE_TIME_WIRE_FORMAT, combine_date_time, decode_submission, is_truthy_text, is_truthy_value,
    split_date_time,
};
pub use table_service::{
    ActionLink, CollectionActionSpec, RowActionSpec, TableModel, TableRow, TableService,
};
