use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "cor", default)]
    pub color: String,
    #[serde(rename = "anoDeFabricacao", default)]
    pub manufacture_year: Option<i32>,
    #[serde(rename = "qtdMultas", default)]
    pub fine_count: u32,
}

#[cfg(test)]
impl Vehicle {
    /// A vehicle with no fines on record.
    pub fn new(plate: &str, kind: &str, color: &str, manufacture_year: Option<i32>) -> Self {
        Vehicle {
            plate: plate.to_string(),
            kind: kind.to_string(),
            color: color.to_string(),
            manufacture_year,
            fine_count: 0,
        }
    }
}
