use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salonkit API",
        version = "0.3.0",
        description = r#"
# Salonkit salon & retail management API

Branch-scoped backend for salons and small retail: shifts and cash cuts,
purchases and supplier credit, sales, appointments, expenses and inventory.

## Authentication

All endpoints require a bearer token identifying the session's user, branch
and account. Include it in the Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

## Error handling

Errors use a consistent response shape with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "a shift is already open for this branch",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        contact(
            name = "Salonkit",
            email = "dev@salonkit.io"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Shifts", description = "Shift lifecycle and reconciliation summaries"),
        (name = "Cash Cuts", description = "Immutable cash reconciliation snapshots"),
        (name = "Purchases", description = "Purchase ledger and partial payments"),
        (name = "Suppliers", description = "Suppliers and running credit balances"),
        (name = "Inventory", description = "Stock movements and levels"),
        (name = "Sales", description = "Point-of-sale tickets"),
        (name = "Appointments", description = "Appointment booking and completion"),
        (name = "Expenses", description = "Branch expenses")
    ),
    paths(
        crate::handlers::shifts::open_shift,
        crate::handlers::shifts::close_shift,
        crate::handlers::shifts::shift_summary,
        crate::handlers::cash_cuts::create_cash_cut,
        crate::handlers::purchases::create_purchase,
        crate::handlers::purchases::add_payment,
        crate::handlers::purchases::cancel_purchase,
        crate::handlers::purchases::delete_purchase,
    ),
    components(
        schemas(
            crate::handlers::shifts::OpenShiftRequest,
            crate::handlers::shifts::CloseShiftRequest,
            crate::handlers::shifts::ShiftSummaryResponse,
            crate::handlers::shifts::SummaryTotals,
            crate::handlers::cash_cuts::CreateCashCutRequest,
            crate::handlers::purchases::CreatePurchaseRequest,
            crate::handlers::purchases::PurchaseLineRequest,
            crate::handlers::purchases::PurchasePaymentRequest,
            crate::handlers::purchases::AddPaymentRequest,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Salonkit API"));
        assert!(json.contains("/api/v1/shifts/open"));
        assert!(json.contains("bearer_auth"));
    }
}
