//! Boundary to the colour-analysis server.
//!
//! Field names follow the server's JSON contract. No HTTP client ships with
//! this crate; hosts implement [`AnalysisBackend`] over whatever transport
//! they use.

use roi_select_core::{Roi, SelectionFlow};
use serde::{Deserialize, Serialize};

/// Smallest side the server accepts for a sample area.
pub const SERVER_MIN_SIDE: i32 = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("invalid region {roi}: origin must be non-negative and size positive")]
    InvalidRoi { roi: Roi },
    #[error("region {roi} does not fit a {width}x{height} image")]
    OutOfBounds { roi: Roi, width: u32, height: u32 },
    #[error("analysis rejected: {message}")]
    Rejected { message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Region of interest as it crosses the wire: `[x, y, w, h]`, validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct BackendRoi(Roi);

impl BackendRoi {
    pub fn new(roi: Roi) -> Result<Self, BackendError> {
        if roi.x < 0 || roi.y < 0 || roi.w <= 0 || roi.h <= 0 {
            return Err(BackendError::InvalidRoi { roi });
        }
        Ok(Self(roi))
    }

    pub fn roi(&self) -> Roi {
        self.0
    }

    /// Same check the server runs before sampling: inside the image and at
    /// least [`SERVER_MIN_SIDE`] pixels per side.
    pub fn check_within(&self, width: u32, height: u32) -> Result<(), BackendError> {
        let r = self.0;
        let fits_x = i64::from(r.x) + i64::from(r.w) <= i64::from(width);
        let fits_y = i64::from(r.y) + i64::from(r.h) <= i64::from(height);
        if fits_x && fits_y && r.w >= SERVER_MIN_SIDE && r.h >= SERVER_MIN_SIDE {
            Ok(())
        } else {
            Err(BackendError::OutOfBounds {
                roi: r,
                width,
                height,
            })
        }
    }
}

impl TryFrom<Roi> for BackendRoi {
    type Error = BackendError;

    fn try_from(roi: Roi) -> Result<Self, Self::Error> {
        Self::new(roi)
    }
}

impl TryFrom<[i32; 4]> for BackendRoi {
    type Error = BackendError;

    fn try_from([x, y, w, h]: [i32; 4]) -> Result<Self, Self::Error> {
        Self::new(Roi::new(x, y, w, h))
    }
}

impl From<BackendRoi> for [i32; 4] {
    fn from(roi: BackendRoi) -> Self {
        roi.0.to_array()
    }
}

/// Table flow: read the reference colours inside `bbox_tabla`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractColorsRequest {
    /// Encoded rectified chart image (data URL).
    pub imagen_rectificada: String,
    pub bbox_tabla: BackendRoi,
    pub user_code: String,
}

/// Sample flow: average the colour inside `area_seleccionada`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeSampleRequest {
    /// Encoded sample image (data URL).
    pub imagen_probeta: String,
    pub tipo_test: String,
    pub area_seleccionada: BackendRoi,
    pub user_code: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisRequest {
    ExtractColors(ExtractColorsRequest),
    AnalyzeSample(AnalyzeSampleRequest),
}

impl AnalysisRequest {
    /// Build the request matching `flow`. `tipo_test` is only used by the
    /// sample flow.
    pub fn for_flow(
        flow: SelectionFlow,
        image: String,
        roi: Roi,
        user_code: &str,
        tipo_test: &str,
    ) -> Result<Self, BackendError> {
        let roi = BackendRoi::new(roi)?;
        Ok(match flow {
            SelectionFlow::Table => Self::ExtractColors(ExtractColorsRequest {
                imagen_rectificada: image,
                bbox_tabla: roi,
                user_code: user_code.to_owned(),
            }),
            SelectionFlow::Probeta => Self::AnalyzeSample(AnalyzeSampleRequest {
                imagen_probeta: image,
                tipo_test: tipo_test.to_owned(),
                area_seleccionada: roi,
                user_code: user_code.to_owned(),
            }),
        })
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::ExtractColors(_) => "/extraer_colores",
            Self::AnalyzeSample(_) => "/analizar_probeta",
        }
    }

    pub fn roi(&self) -> BackendRoi {
        match self {
            Self::ExtractColors(r) => r.bbox_tabla,
            Self::AnalyzeSample(r) => r.area_seleccionada,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::ExtractColors(r) => serde_json::to_string(r),
            Self::AnalyzeSample(r) => serde_json::to_string(r),
        }
    }
}

/// A reference colour close to the sampled one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearbyValue {
    pub parametro: String,
    pub valor: f64,
    pub color_rgb: [u8; 3],
    pub distancia: f64,
}

/// Server reply. Only `exito` and `mensaje` matter to the selection side; the
/// rest is passed through for display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    pub exito: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_final: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parametro_cercano: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confianza: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_rgb: Option<[u8; 3]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub valores_cercanos: Vec<NearbyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_debug: Option<String>,
}

impl AnalysisResponse {
    /// `Err(Rejected)` unless the server reported success.
    pub fn into_result(self) -> Result<Self, BackendError> {
        if self.exito {
            Ok(self)
        } else {
            Err(BackendError::Rejected {
                message: self
                    .mensaje
                    .unwrap_or_else(|| "unknown server error".to_owned()),
            })
        }
    }
}

/// Transport seam to the analysis server.
pub trait AnalysisBackend {
    fn extract_colors(
        &mut self,
        request: &ExtractColorsRequest,
    ) -> Result<AnalysisResponse, BackendError>;

    fn analyze_sample(
        &mut self,
        request: &AnalyzeSampleRequest,
    ) -> Result<AnalysisResponse, BackendError>;

    /// Dispatch by request kind and turn `exito: false` into an error.
    fn submit(&mut self, request: &AnalysisRequest) -> Result<AnalysisResponse, BackendError> {
        log::info!(
            "submitting {} with region {}",
            request.endpoint(),
            request.roi().roi()
        );
        let response = match request {
            AnalysisRequest::ExtractColors(r) => self.extract_colors(r)?,
            AnalysisRequest::AnalyzeSample(r) => self.analyze_sample(r)?,
        };
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_roi_rejects_malformed_boxes() {
        assert!(BackendRoi::new(Roi::new(0, 0, 1, 1)).is_ok());
        for bad in [
            Roi::new(-1, 0, 10, 10),
            Roi::new(0, -3, 10, 10),
            Roi::new(0, 0, 0, 10),
            Roi::new(0, 0, 10, -2),
        ] {
            assert_eq!(
                BackendRoi::new(bad),
                Err(BackendError::InvalidRoi { roi: bad })
            );
        }
    }

    #[test]
    fn backend_roi_is_a_json_array() {
        let roi = BackendRoi::new(Roi::new(500, 500, 1000, 750)).unwrap();
        assert_eq!(serde_json::to_string(&roi).unwrap(), "[500,500,1000,750]");
        let back: BackendRoi = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(back.roi(), Roi::new(1, 2, 3, 4));
        assert!(serde_json::from_str::<BackendRoi>("[1,2,0,4]").is_err());
    }

    #[test]
    fn server_bounds_check() {
        let roi = BackendRoi::new(Roi::new(90, 90, 10, 10)).unwrap();
        assert!(roi.check_within(100, 100).is_ok());
        assert!(roi.check_within(99, 100).is_err());
        let thin = BackendRoi::new(Roi::new(0, 0, 4, 50)).unwrap();
        assert!(thin.check_within(100, 100).is_err());
    }

    #[test]
    fn requests_use_wire_field_names() {
        let table = AnalysisRequest::for_flow(
            SelectionFlow::Table,
            "data:image/png;base64,AAAA".into(),
            Roi::new(1, 2, 30, 40),
            "U1",
            "",
        )
        .unwrap();
        assert_eq!(table.endpoint(), "/extraer_colores");
        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json["bbox_tabla"], serde_json::json!([1, 2, 30, 40]));
        assert_eq!(json["user_code"], "U1");
        assert!(json.get("imagen_rectificada").is_some());

        let sample = AnalysisRequest::for_flow(
            SelectionFlow::Probeta,
            "data:image/jpeg;base64,AAAA".into(),
            Roi::new(5, 6, 70, 80),
            "U1",
            "nitrite",
        )
        .unwrap();
        assert_eq!(sample.endpoint(), "/analizar_probeta");
        let json: serde_json::Value = serde_json::from_str(&sample.to_json().unwrap()).unwrap();
        assert_eq!(json["area_seleccionada"], serde_json::json!([5, 6, 70, 80]));
        assert_eq!(json["tipo_test"], "nitrite");
    }

    #[test]
    fn collapsed_roi_never_becomes_a_request() {
        let err = AnalysisRequest::for_flow(
            SelectionFlow::Table,
            String::new(),
            Roi::new(0, 0, 0, 0),
            "U1",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::InvalidRoi { .. }));
    }

    #[test]
    fn response_parses_server_payloads() {
        let ok: AnalysisResponse = serde_json::from_str(
            r#"{"exito": true, "valor_final": 0.5, "parametro_cercano": "nitrite 0.5",
                "confianza": 0.93, "interpolado": false, "color_rgb": [200, 120, 180],
                "valores_cercanos": [{"parametro": "nitrite 0.5", "valor": 0.5,
                "color_rgb": [201, 119, 182], "distancia": 2.4}]}"#,
        )
        .unwrap();
        let ok = ok.into_result().unwrap();
        assert_eq!(ok.valores_cercanos.len(), 1);
        assert_eq!(ok.color_rgb, Some([200, 120, 180]));

        let failed: AnalysisResponse =
            serde_json::from_str(r#"{"exito": false, "mensaje": "Faltan datos requeridos"}"#)
                .unwrap();
        assert_eq!(
            failed.into_result(),
            Err(BackendError::Rejected {
                message: "Faltan datos requeridos".into()
            })
        );
    }

    struct Canned(AnalysisResponse);

    impl AnalysisBackend for Canned {
        fn extract_colors(
            &mut self,
            _: &ExtractColorsRequest,
        ) -> Result<AnalysisResponse, BackendError> {
            Ok(self.0.clone())
        }

        fn analyze_sample(
            &mut self,
            _: &AnalyzeSampleRequest,
        ) -> Result<AnalysisResponse, BackendError> {
            Err(BackendError::Transport("offline".into()))
        }
    }

    #[test]
    fn submit_dispatches_by_kind() {
        let mut backend = Canned(AnalysisResponse {
            exito: true,
            ..Default::default()
        });
        let table = AnalysisRequest::for_flow(
            SelectionFlow::Table,
            String::new(),
            Roi::new(0, 0, 10, 10),
            "U",
            "",
        )
        .unwrap();
        assert!(backend.submit(&table).is_ok());

        let sample = AnalysisRequest::for_flow(
            SelectionFlow::Probeta,
            String::new(),
            Roi::new(0, 0, 10, 10),
            "U",
            "ph",
        )
        .unwrap();
        assert_eq!(
            backend.submit(&sample),
            Err(BackendError::Transport("offline".into()))
        );
    }
}
