//! Database schema definitions

pub const COL_ID: &str = "id";

/// SQL to create the appointments table
pub const CREATE_CITAS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS citas (
    id INTEGER PRIMARY KEY,
    nombre_cliente TEXT,
    servicio TEXT,
    fecha DATE,
    hora TIME,
    estado TEXT
)
"#;

pub const SELECT_ALL: &str = "SELECT * FROM citas";

/// Typed read. `fecha` and `hora` have NUMERIC affinity, so a time like `10`
/// is stored as an INTEGER; every business column is cast back to text.
pub const SELECT_COLUMNS: &str = r#"
SELECT id,
       CAST(nombre_cliente AS TEXT),
       CAST(servicio AS TEXT),
       CAST(fecha AS TEXT),
       CAST(hora AS TEXT),
       CAST(estado AS TEXT)
FROM citas"#;

pub const INSERT_CITA: &str = r#"
INSERT INTO citas (nombre_cliente, servicio, fecha, hora, estado)
VALUES (:nombre_cliente, :servicio, :fecha, :hora, :estado)
"#;

pub const UPDATE_CITA: &str = r#"
UPDATE citas
SET nombre_cliente = :nombre_cliente,
    servicio = :servicio,
    fecha = :fecha,
    hora = :hora,
    estado = :estado
WHERE id = :id
"#;

pub const DELETE_CITA: &str = "DELETE FROM citas WHERE id = ?1";

/// Client name contains `?1`; `\` escapes `%` and `_` so they match literally
pub const WHERE_NAME_CONTAINS: &str = "WHERE nombre_cliente LIKE ?1 ESCAPE '\\'";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_CITAS_TABLE]
}
