use anyhow::{Result, bail};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub type FilterFn = dyn Fn(&Path) -> bool + Send + Sync;

#[derive(Clone)]
pub struct Filter {
    name: String,
    tester: Arc<FilterFn>,
}

impl Filter {
    pub fn new(
        name: impl Into<String>,
        tester: impl Fn(&Path) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            tester: Arc::new(tester),
        }
    }

    pub fn extensions(name: impl Into<String>, extensions: &[&str]) -> Self {
        let wanted: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self::new(name, move |path: &Path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| wanted.iter().any(|w| w.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, path: &Path) -> bool {
        (self.tester)(path)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filters {
    filters: Vec<Filter>,
}

impl Filters {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let mut filters = Vec::new();
        for spec in specs {
            filters.push(parse_filter_spec(spec.as_ref())?);
        }
        Ok(Self::new(filters))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, index: usize) -> Option<&Filter> {
        self.filters.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(Filter::name).collect()
    }
}

fn parse_filter_spec(spec: &str) -> Result<Filter> {
    let Some((name, extensions)) = spec.split_once('=') else {
        bail!("invalid filter {spec:?}: expected NAME=ext[,ext...]");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid filter {spec:?}: name is empty");
    }

    let extensions: Vec<&str> = extensions
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .collect();
    if extensions.is_empty() || extensions == ["*"] {
        return Ok(Filter::new(name, |_| true));
    }
    Ok(Filter::extensions(name, &extensions))
}
