// [libs/domain/models/src/tests_serialization.rs]
/**
 * =================================================================
 * APARATO: DOMAIN SERIALIZATION TEST (V6.0 - INTEGRATION LEVEL)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON CON EL PUENTE
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. WIRE PARITY: Valida que los vocabularios cerrados viajen con sus
 *    cadenas históricas exactas (en_ruta, alerta_paro_ia, atendida).
 * 2. TOLERANT INGESTION: Certifica que las filas del puente con
 *    booleanos 0/1 y números-texto hidraten tipos firmes del dominio.
 * =================================================================
 */
