//! Pre-delete guard for clients.

use crate::db::Gateway;
use crate::error::{AppError, AppResult};

pub const TIENE_CUENTAS_PENDIENTES: &str =
    "No se puede eliminar el cliente porque tiene cuentas por cobrar pendientes";
pub const TIENE_COTIZACIONES_EN_PROCESO: &str =
    "No se puede eliminar el cliente porque tiene cotizaciones en proceso";

/// Block deletion while the client has pending receivables or in-process quotations.
pub async fn validar_eliminacion_cliente(gateway: &dyn Gateway, cliente_id: i32) -> AppResult<()> {
    if gateway.cliente_tiene_cuentas_pendientes(cliente_id).await? {
        return Err(AppError::InvalidInput(TIENE_CUENTAS_PENDIENTES.to_string()));
    }
    if gateway.cliente_tiene_cotizaciones_en_proceso(cliente_id).await? {
        return Err(AppError::InvalidInput(
            TIENE_COTIZACIONES_EN_PROCESO.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::gateway::fake::FakeGateway;

    #[actix_rt::test]
    async fn test_clean_client_passes() {
        let gw = FakeGateway::default();
        validar_eliminacion_cliente(&gw, 4).await.unwrap();
        assert_eq!(gw.consultas(), 2);
    }

    #[actix_rt::test]
    async fn test_pending_receivable_blocks() {
        let mut gw = FakeGateway::default();
        gw.cuentas_pendientes.insert(4);

        let err = validar_eliminacion_cliente(&gw, 4).await.unwrap_err();
        assert_eq!(err.to_string(), TIENE_CUENTAS_PENDIENTES);
    }

    #[actix_rt::test]
    async fn test_in_process_quotation_blocks() {
        let mut gw = FakeGateway::default();
        gw.cotizaciones_en_proceso.insert(4);

        let err = validar_eliminacion_cliente(&gw, 4).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.to_string(), TIENE_COTIZACIONES_EN_PROCESO);
    }

    #[actix_rt::test]
    async fn test_query_failure_is_server_error() {
        let mut gw = FakeGateway::default();
        gw.falla = true;
        let err = validar_eliminacion_cliente(&gw, 4).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
