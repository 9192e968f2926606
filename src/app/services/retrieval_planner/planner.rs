//! Query resolution, windowing, pagination and result assembly

use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info};

use super::cursor::{CursorSigner, Direction, PageCursor};
use super::query::{RetrievalQuery, VersionMode};
use super::result::{ResultRow, RetrievalResult};
use super::window::WindowReader;
use crate::app::models::{DecodedRow, ParserDefinition, ProfileInstanceKey};
use crate::app::services::aggregation::{AggregationMode, AggregationResolver, latest_with_data};
use crate::app::services::instance_store::VersionedInstanceStore;
use crate::app::services::parser_registry::ParserDefinitionRegistry;
use crate::app::services::profile_decoder::ParsedTz;
use crate::app::services::unit_converter::{LinearConversion, UnitConverter};
use crate::config::{Config, RetrievalConfig};
use crate::{Error, Result};

/// Value columns after unit resolution
#[derive(Debug, Default)]
struct Columns {
    parameters: Vec<String>,
    units: Vec<String>,
    conversions: Vec<LinearConversion>,
}

impl Columns {
    fn convert(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(ordinal, value)| {
                value.map(|v| match self.conversions.get(ordinal) {
                    Some(conversion) => conversion.apply(v),
                    None => v,
                })
            })
            .collect()
    }
}

/// Resolves retrieval queries against the instance store
///
/// Stateless between calls: every result is a function of stored data and
/// the query. Cursors carry the only paging state and are signed.
#[derive(Debug)]
pub struct RetrievalPlanner {
    store: Arc<VersionedInstanceStore>,
    definitions: Arc<ParserDefinitionRegistry>,
    converter: Arc<UnitConverter>,
    signer: CursorSigner,
    settings: RetrievalConfig,
}

impl RetrievalPlanner {
    pub fn new(
        store: Arc<VersionedInstanceStore>,
        definitions: Arc<ParserDefinitionRegistry>,
        converter: Arc<UnitConverter>,
        settings: &RetrievalConfig,
    ) -> Self {
        Self {
            store,
            definitions,
            converter,
            signer: CursorSigner::new(&settings.cursor_secret),
            settings: settings.clone(),
        }
    }

    /// Planner with the configured retrieval settings and unit table
    pub fn from_config(
        store: Arc<VersionedInstanceStore>,
        definitions: Arc<ParserDefinitionRegistry>,
        config: &Config,
    ) -> Result<Self> {
        let converter = Arc::new(UnitConverter::from_config(&config.units)?);
        Ok(Self::new(store, definitions, converter, &config.retrieval))
    }

    /// Resolve one page of a query
    ///
    /// # Arguments
    /// * `query` - Series address, selectors, window, units and paging
    ///
    /// # Returns
    /// The page with cursors for the neighbouring pages
    pub fn retrieve(&self, query: &RetrievalQuery) -> Result<RetrievalResult> {
        // Everything checkable without stored data is checked first
        let mode = VersionMode::for_query(query)?;
        query.window.validate()?;
        let page_size = self.page_size(query)?;
        let zone_name = query
            .time_zone
            .clone()
            .unwrap_or_else(|| self.settings.default_time_zone.clone());
        let zone = ParsedTz::parse(&zone_name)?;
        let fingerprint = query.fingerprint();
        let cursor = query
            .page_cursor
            .as_deref()
            .map(|token| self.signer.decode(token, &fingerprint))
            .transpose()?;
        let columns = self.columns(query)?;

        let (mode, reader) = self.plan(query, mode)?;
        debug!(
            "Resolving {}/{}/{} in {:?} mode over {} partition(s)",
            query.office,
            query.location,
            query.key_parameter,
            mode,
            reader.keys().len()
        );

        let sequence = reader.resolve(&query.window, query.previous, query.next, page_size)?;
        if mode == VersionMode::Exact && sequence.is_empty() {
            return Err(Error::not_found(format!(
                "data for {} in the requested window",
                reader.keys()[0]
            )));
        }

        let range = page_range(&sequence, cursor.as_ref(), page_size);
        let page = &sequence[range.clone()];

        let previous_cursor = (range.start > 0).then(|| {
            let anchor = page
                .first()
                .map(|r| r.timestamp)
                .unwrap_or_else(|| sequence[range.start - 1].timestamp.saturating_add(1));
            self.signer
                .encode(&PageCursor::new(fingerprint, Direction::Backward, anchor))
        });
        let next_cursor = (range.end < sequence.len()).then(|| {
            let anchor = page
                .last()
                .map(|r| r.timestamp)
                .unwrap_or_else(|| sequence[range.end].timestamp.saturating_sub(1));
            self.signer
                .encode(&PageCursor::new(fingerprint, Direction::Forward, anchor))
        });

        let rows: Vec<ResultRow> = page
            .iter()
            .map(|row| ResultRow {
                timestamp: row.timestamp,
                time: zone
                    .format_millis(row.timestamp)
                    .unwrap_or_else(|| row.timestamp.to_string()),
                values: columns.convert(&row.values),
            })
            .collect();

        info!(
            "Retrieved {} of {} row(s) for {}/{}/{}",
            rows.len(),
            sequence.len(),
            query.office,
            query.location,
            query.key_parameter
        );

        Ok(RetrievalResult {
            office: query.office.clone(),
            location: query.location.clone(),
            key_parameter: query.key_parameter.clone(),
            version: query.version.clone(),
            mode,
            sources: reader.keys().to_vec(),
            time_zone: zone_name,
            units: columns.units,
            parameters: columns.parameters,
            page_size,
            total_rows: sequence.len(),
            first_timestamp: sequence.first().map(|r| r.timestamp),
            last_timestamp: sequence.last().map(|r| r.timestamp),
            page_first_timestamp: page.first().map(|r| r.timestamp),
            page_last_timestamp: page.last().map(|r| r.timestamp),
            rows,
            next_cursor,
            previous_cursor,
        })
    }

    fn page_size(&self, query: &RetrievalQuery) -> Result<usize> {
        let page_size = query.page_size.unwrap_or(self.settings.default_page_size);
        if page_size == 0 || page_size > self.settings.max_page_size {
            return Err(Error::invalid_argument(format!(
                "Page size must be between 1 and {}, got {}",
                self.settings.max_page_size, page_size
            )));
        }
        Ok(page_size)
    }

    /// Parameter names, units and conversions for the value columns
    fn columns(&self, query: &RetrievalQuery) -> Result<Columns> {
        let definition = match self
            .definitions
            .get(&query.location_id(), &query.key_parameter)
        {
            Ok(definition) => definition,
            Err(Error::NotFound { .. }) if query.requested_units.is_empty() => {
                return Ok(Columns::default());
            }
            Err(e) => return Err(e),
        };

        self.resolve_units(&definition, &query.requested_units)
    }

    fn resolve_units(&self, definition: &ParserDefinition, requested: &[String]) -> Result<Columns> {
        let mut units = definition.units();
        if requested.len() > units.len() {
            return Err(Error::invalid_argument(format!(
                "{} unit(s) requested but {} / {} has {} parameter(s)",
                requested.len(),
                definition.location_id,
                definition.key_parameter,
                units.len()
            )));
        }

        let mut conversions = Vec::with_capacity(requested.len());
        for (canonical, target) in units.iter_mut().zip(requested) {
            conversions.push(self.converter.conversion(canonical, target)?);
            *canonical = target.clone();
        }

        Ok(Columns {
            parameters: definition.parameter_names(),
            units,
            conversions,
        })
    }

    /// Pick the partitions the query reads and how they combine
    fn plan(&self, query: &RetrievalQuery, mode: VersionMode) -> Result<(VersionMode, WindowReader<'_>)> {
        let (office, location, key_parameter) =
            (&query.office, &query.location, &query.key_parameter);
        let store = self.store.as_ref();

        match (mode, query.version.as_deref()) {
            (VersionMode::Exact, Some(version)) => {
                let key = ProfileInstanceKey::new(office, location, key_parameter, version, query.version_date);
                if !store.contains(&key)? {
                    return Err(Error::not_found(format!("instance {}", key)));
                }
                Ok((VersionMode::Exact, WindowReader::single(store, key)))
            }
            (VersionMode::Latest, Some(version)) => {
                let keys = store.version_keys(office, location, key_parameter, version)?;
                let counts = keys
                    .iter()
                    .map(|key| Ok((key, store.count_in_window(key, &query.window)?)))
                    .collect::<Result<Vec<_>>>()?;
                let latest = latest_with_data(counts).cloned().ok_or_else(|| {
                    Error::not_found(format!(
                        "version '{}' of {}/{}/{} with data in the requested window",
                        version, office, location, key_parameter
                    ))
                })?;
                Ok((VersionMode::Latest, WindowReader::single(store, latest)))
            }
            (VersionMode::MaxVersion, version) => {
                let keys = match version {
                    Some(version) => store.version_keys(office, location, key_parameter, version)?,
                    None => store.series_keys(office, location, key_parameter)?,
                };
                let keys = non_empty(keys, query)?;
                let resolver = AggregationResolver::new(AggregationMode::MaxVersion);
                Ok((VersionMode::MaxVersion, WindowReader::folded(store, keys, resolver)))
            }
            _ => {
                let keys = non_empty(store.series_keys(office, location, key_parameter)?, query)?;
                if let [only] = keys.as_slice() {
                    if only.version_date.is_none() {
                        let key = only.clone();
                        return Ok((VersionMode::Unversioned, WindowReader::single(store, key)));
                    }
                }
                let resolver = AggregationResolver::new(AggregationMode::MaxAggregate);
                Ok((VersionMode::MaxAggregate, WindowReader::folded(store, keys, resolver)))
            }
        }
    }
}

fn non_empty(keys: Vec<ProfileInstanceKey>, query: &RetrievalQuery) -> Result<Vec<ProfileInstanceKey>> {
    if keys.is_empty() {
        return Err(Error::not_found(format!(
            "series {}/{}/{}{}",
            query.office,
            query.location,
            query.key_parameter,
            query
                .version
                .as_deref()
                .map(|v| format!(" version '{}'", v))
                .unwrap_or_default()
        )));
    }
    Ok(keys)
}

/// Index range of the page selected by `cursor`
fn page_range(sequence: &[DecodedRow], cursor: Option<&PageCursor>, page_size: usize) -> Range<usize> {
    let len = sequence.len();
    match cursor {
        None => 0..page_size.min(len),
        Some(cursor) => match cursor.direction {
            Direction::Forward => {
                let start = sequence.partition_point(|r| r.timestamp <= cursor.timestamp);
                start..start.saturating_add(page_size).min(len)
            }
            Direction::Backward => {
                let end = sequence.partition_point(|r| r.timestamp < cursor.timestamp);
                end.saturating_sub(page_size)..end
            }
        },
    }
}
