//! WMTS capability document client. The document is fetched once per map
//! session initialisation and reduced to the options the surface needs.

use std::future::Future;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::AppConfig;
use crate::error::AppError;

/// Structured options extracted from the capability document for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSourceOptions {
    pub layer: String,
    pub style: String,
    pub format: String,
    pub matrix_set: String,
}

pub trait CapabilitiesSource {
    fn fetch(&self) -> impl Future<Output = Result<TileSourceOptions, AppError>> + Send;
}

#[derive(Debug, Clone)]
pub struct WmtsClient {
    http: reqwest::Client,
    url: String,
    layer: String,
    matrix_set: String,
}

impl WmtsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.wmts_url.clone(),
            layer: config.wmts_layer.clone(),
            matrix_set: config.wmts_matrix_set.clone(),
        }
    }
}

impl CapabilitiesSource for WmtsClient {
    async fn fetch(&self) -> Result<TileSourceOptions, AppError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_capabilities(&body, &self.layer, &self.matrix_set)
    }
}

#[derive(Debug, Default)]
struct LayerEntry {
    identifier: String,
    style: String,
    format: String,
    matrix_sets: Vec<String>,
}

/// Reduce a WMTS `GetCapabilities` document to the options for the requested
/// layer, failing when the layer or its matrix set is not advertised.
pub fn parse_capabilities(
    xml: &str,
    layer: &str,
    matrix_set: &str,
) -> Result<TileSourceOptions, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut layers: Vec<LayerEntry> = Vec::new();
    let mut current: Option<LayerEntry> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if name == "Layer" && stack.last().map(String::as_str) == Some("Contents") {
                    current = Some(LayerEntry::default());
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                if closed.as_deref() == Some("Layer")
                    && stack.last().map(String::as_str) == Some("Contents")
                {
                    if let Some(entry) = current.take() {
                        layers.push(entry);
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                let value = text
                    .unescape()
                    .map_err(|err| AppError::MapInit(format!("invalid capabilities XML: {err}")))?;
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if ends_with(&stack, &["Layer", "Identifier"]) {
                    entry.identifier = value.to_string();
                } else if ends_with(&stack, &["Style", "Identifier"]) {
                    entry.style = value.to_string();
                } else if ends_with(&stack, &["Layer", "Format"]) && entry.format.is_empty() {
                    entry.format = value.to_string();
                } else if ends_with(&stack, &["TileMatrixSetLink", "TileMatrixSet"]) {
                    entry.matrix_sets.push(value.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(AppError::MapInit(format!("invalid capabilities XML: {err}")));
            }
        }
    }

    let entry = layers
        .iter()
        .find(|candidate| candidate.identifier == layer)
        .ok_or_else(|| AppError::MapInit(format!("layer {layer} not advertised by provider")))?;
    if !entry.matrix_sets.iter().any(|set| set == matrix_set) {
        return Err(AppError::MapInit(format!(
            "matrix set {matrix_set} not available for layer {layer}"
        )));
    }

    Ok(TileSourceOptions {
        layer: entry.identifier.clone(),
        style: if entry.style.is_empty() {
            "normal".to_string()
        } else {
            entry.style.clone()
        },
        format: entry.format.clone(),
        matrix_set: matrix_set.to_string(),
    })
}

fn ends_with(stack: &[String], tail: &[&str]) -> bool {
    stack.len() >= tail.len()
        && stack[stack.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(have, want)| have == want)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0" xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification>
    <ows:Title>WMTS server</ows:Title>
  </ows:ServiceIdentification>
  <Contents>
    <Layer>
      <ows:Title>Plan IGN v2</ows:Title>
      <ows:Identifier>GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2</ows:Identifier>
      <Style isDefault="true">
        <ows:Identifier>normal</ows:Identifier>
      </Style>
      <Format>image/png</Format>
      <TileMatrixSetLink>
        <TileMatrixSet>PM</TileMatrixSet>
      </TileMatrixSetLink>
    </Layer>
    <Layer>
      <ows:Identifier>ORTHOIMAGERY.ORTHOPHOTOS</ows:Identifier>
      <Style>
        <ows:Identifier>normal</ows:Identifier>
      </Style>
      <Format>image/jpeg</Format>
      <TileMatrixSetLink>
        <TileMatrixSet>PM_6_19</TileMatrixSet>
      </TileMatrixSetLink>
    </Layer>
  </Contents>
</Capabilities>"#;

    #[test]
    fn parses_requested_layer() {
        let options =
            parse_capabilities(SAMPLE, "GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2", "PM").unwrap();
        assert_eq!(options.layer, "GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2");
        assert_eq!(options.style, "normal");
        assert_eq!(options.format, "image/png");
        assert_eq!(options.matrix_set, "PM");
    }

    #[test]
    fn missing_layer_is_an_init_error() {
        let err = parse_capabilities(SAMPLE, "NO.SUCH.LAYER", "PM").unwrap_err();
        assert!(matches!(err, AppError::MapInit(_)), "got {err:?}");
    }

    #[test]
    fn missing_matrix_set_is_an_init_error() {
        let err =
            parse_capabilities(SAMPLE, "ORTHOIMAGERY.ORTHOPHOTOS", "PM").unwrap_err();
        assert!(matches!(err, AppError::MapInit(_)), "got {err:?}");
    }

    #[test]
    fn garbage_document_is_an_init_error() {
        let err = parse_capabilities("<Contents><Layer></Oops></Contents>", "X", "PM").unwrap_err();
        assert!(matches!(err, AppError::MapInit(_)), "got {err:?}");
    }
}
