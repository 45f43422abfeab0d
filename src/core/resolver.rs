// Name -> values resolution over decoded columns, with complex projections

use crate::core::constants::DB20_MAGNITUDE_FLOOR;
use crate::core::error::{Result, WaveformError};
use crate::core::format::{
    Accessor, ColumnData, SignalAliasTable, SignalKind, SignalReference,
};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{trace, warn};

/// Read-only handle bound to the decoded columns of one load.
#[derive(Debug, Clone)]
pub struct SignalResolver {
    independent_name: String,
    independent: Arc<ColumnData>,
    /// Canonical paths in signal order.
    order: Vec<String>,
    signals: HashMap<String, Arc<ColumnData>>,
    aliases: SignalAliasTable,
}

impl SignalResolver {
    pub fn new(
        independent_name: String,
        independent_values: Vec<f64>,
        signals: Vec<(String, Arc<ColumnData>)>,
        aliases: SignalAliasTable,
    ) -> Self {
        let order = signals.iter().map(|(path, _)| path.clone()).collect();
        let resolver = Self {
            independent_name,
            independent: Arc::new(ColumnData::Real(independent_values)),
            order,
            signals: signals.into_iter().collect(),
            aliases,
        };
        for path in &resolver.order {
            let is_real = resolver.signals[path].kind() == SignalKind::Real;
            if is_real && !resolver.selects(path, None) {
                warn!(
                    "Signal '{}' is shadowed by an accessor on another signal and cannot be selected",
                    path
                );
            }
        }
        resolver
    }

    /// Canonical path first, then the independent variable, then aliases.
    fn lookup(&self, base: &str) -> Option<&ColumnData> {
        if let Some(data) = self.signals.get(base) {
            return Some(data.as_ref());
        }
        if base == self.independent_name {
            return Some(self.independent.as_ref());
        }
        self.aliases
            .get(base)
            .and_then(|path| self.signals.get(path))
            .map(|data| data.as_ref())
    }

    pub fn signal_kind(&self, base: &str) -> Option<SignalKind> {
        self.lookup(base).map(ColumnData::kind)
    }

    /// The column `name` refers to and the accessor to apply. The accessor
    /// split wins; the whole name is only tried when the split base is unknown.
    fn target<'a, 'n>(&'a self, name: &'n str) -> Option<(&'n str, &'a ColumnData, Option<Accessor>)> {
        let reference = SignalReference::parse(name)?;
        if let Some(data) = self.lookup(&reference.base) {
            let base = &name[..reference.base.len()];
            return Some((base, data, reference.accessor));
        }
        if reference.accessor.is_some() {
            if let Some(data) = self.lookup(name) {
                return Some((name, data, None));
            }
        }
        None
    }

    /// Whether `name` resolves to the signal stored under `path` with `accessor`.
    fn selects(&self, path: &str, accessor: Option<Accessor>) -> bool {
        let name = match accessor {
            Some(accessor) => SignalReference::qualified(path, accessor),
            None => path.to_string(),
        };
        match (self.target(&name), self.signals.get(path)) {
            (Some((_, data, found)), Some(expected)) => {
                found == accessor && std::ptr::eq(data, expected.as_ref())
            }
            _ => false,
        }
    }

    /// Values for `name` (`base` or `base.accessor`). Unknown names yield
    /// `Ok(None)`; known names used with the wrong accessor are errors.
    pub fn resolve(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let Some((base, data, accessor)) = self.target(name) else {
            trace!("no signal named '{}'", name);
            return Ok(None);
        };

        match (data, accessor) {
            (ColumnData::Real(values), None) => Ok(Some(values.clone())),
            (ColumnData::Real(_), Some(accessor)) => Err(WaveformError::RealSignalAccessor {
                signal: base.to_string(),
                accessor,
            }),
            (ColumnData::Complex { .. }, None) => Err(WaveformError::MissingAccessor {
                signal: base.to_string(),
            }),
            (ColumnData::Complex { re, im }, Some(accessor)) => {
                project(base, accessor, re, im).map(Some)
            }
        }
    }

    /// Every name that resolves without error back to its own signal: real
    /// signals as-is and one `path.accessor` entry per accessor for complex
    /// signals. Paths shadowed by an accessor split are left out.
    pub fn selectable_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.order.len());
        for path in &self.order {
            match self.signals[path].kind() {
                SignalKind::Real => {
                    if self.selects(path, None) {
                        names.push(path.clone());
                    }
                }
                SignalKind::Complex => names.extend(
                    Accessor::ALL
                        .iter()
                        .filter(|accessor| self.selects(path, Some(**accessor)))
                        .map(|accessor| SignalReference::qualified(path, *accessor)),
                ),
            }
        }
        names
    }

    pub fn independent_name(&self) -> &str {
        &self.independent_name
    }

    pub fn aliases(&self) -> &SignalAliasTable {
        &self.aliases
    }
}

/// Real-valued projection of a complex signal. Fails as a whole if any
/// projected sample is not finite.
pub fn project(signal: &str, accessor: Accessor, re: &[f64], im: &[f64]) -> Result<Vec<f64>> {
    if re.len() != im.len() {
        return Err(WaveformError::ComplexLengthMismatch {
            signal: signal.to_string(),
            re_len: re.len(),
            im_len: im.len(),
        });
    }

    let pairs = re.iter().zip(im.iter());
    let values: Vec<f64> = match accessor {
        Accessor::Re => re.to_vec(),
        Accessor::Im => im.to_vec(),
        Accessor::Mag => pairs.map(|(r, i)| r.hypot(*i)).collect(),
        Accessor::Phase => pairs.map(|(r, i)| i.atan2(*r) * 180.0 / PI).collect(),
        Accessor::Db20 => pairs
            .map(|(r, i)| 20.0 * r.hypot(*i).max(DB20_MAGNITUDE_FLOOR).log10())
            .collect(),
    };

    if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(WaveformError::Projection {
            signal: signal.to_string(),
            accessor,
            index,
            value: *value,
        });
    }
    Ok(values)
}
