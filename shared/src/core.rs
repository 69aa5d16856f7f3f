use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use rand_distr::{Normal, NormalError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

const USER_ID_LENGTH: usize = 10;
const MIN_AGE: f64 = 16.0;
const MAX_AGE: f64 = 80.0;
const MEAN_AGE: f64 = 35.0;
const AGE_STD_DEV: f64 = 10.0;
const LOOKBACK_DAYS: i64 = 60;

const EVENT_TYPE_WEIGHTS: [(EventType, f64); 3] = [
    (EventType::Click, 0.6),
    (EventType::Search, 0.3),
    (EventType::Purchase, 0.1),
];

const USER_ACTION_WEIGHTS: [(UserAction, f64); 5] = [
    (UserAction::HomePage, 0.2),
    (UserAction::ProductPage, 0.4),
    (UserAction::CartPage, 0.2),
    (UserAction::CheckoutPage, 0.1),
    (UserAction::SearchPage, 0.1),
];

const PRODUCT_CATEGORY_WEIGHTS: [(ProductCategory, f64); 6] = [
    (ProductCategory::Electronics, 0.3),
    (ProductCategory::Clothing, 0.2),
    (ProductCategory::Books, 0.2),
    (ProductCategory::HomeAppliances, 0.1),
    (ProductCategory::Toys, 0.1),
    (ProductCategory::Other, 0.1),
];

// Relative weights: they add up to 0.35, not 1.0.
const LOCATION_WEIGHTS: [(&str, f64); 20] = [
    ("1", 0.07),
    ("2", 0.005),
    ("3", 0.01),
    ("4", 0.03),
    ("5", 0.03),
    ("6", 0.005),
    ("7", 0.02),
    ("8", 0.01),
    ("9", 0.01),
    ("10", 0.01),
    ("11", 0.01),
    ("12", 0.02),
    ("13", 0.005),
    ("14", 0.01),
    ("15", 0.005),
    ("16", 0.02),
    ("17", 0.02),
    ("18", 0.01),
    ("19", 0.02),
    ("20", 0.03),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    Search,
    Purchase,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Search => "search",
            EventType::Purchase => "purchase",
        }
    }

    /// Only clicks and purchases are tied to a product.
    pub fn has_product_category(&self) -> bool {
        matches!(self, EventType::Click | EventType::Purchase)
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    HomePage,
    ProductPage,
    CartPage,
    CheckoutPage,
    SearchPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Books,
    HomeAppliances,
    Toys,
    Other,
}

/// A single simulated user interaction, written as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickstreamEvent {
    pub event_type: EventType,
    pub user_id: String,
    pub user_action: UserAction,
    pub product_category: Option<ProductCategory>,
    pub location: String,
    pub user_age: u8,
    pub timestamp: i64,
}

impl ClickstreamEvent {
    pub fn object_key(&self) -> String {
        format!(
            "raw/{}_{}_{}.json",
            self.event_type, self.user_id, self.timestamp
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid weights for {table}: {source}")]
    Weights {
        table: &'static str,
        #[source]
        source: WeightedError,
    },
    #[error("invalid age distribution: {0}")]
    AgeDistribution(#[from] NormalError),
}

#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    options: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Clone> WeightedChoice<T> {
    pub fn new(table: &'static str, weighted: &[(T, f64)]) -> Result<Self, CatalogError> {
        let index = WeightedIndex::new(weighted.iter().map(|(_, weight)| *weight))
            .map_err(|source| CatalogError::Weights { table, source })?;
        let options = weighted.iter().map(|(option, _)| option.clone()).collect();

        Ok(Self { options, index })
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.options[self.index.sample(rng)].clone()
    }
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
pub trait EventGenerator {
    fn generate_event(&self) -> ClickstreamEvent;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait EventPublisher {
    /// Writes the event to `bucket_name` and returns the key it was stored under.
    async fn publish_event(
        &self,
        bucket_name: &str,
        event: &ClickstreamEvent,
    ) -> Result<String, Error>;
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait ParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, Error>;
}

#[derive(Debug)]
pub struct RandomEventGenerator {
    event_types: WeightedChoice<EventType>,
    user_actions: WeightedChoice<UserAction>,
    product_categories: WeightedChoice<ProductCategory>,
    locations: WeightedChoice<&'static str>,
    age: Normal<f64>,
}

impl RandomEventGenerator {
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            event_types: WeightedChoice::new("event_type", &EVENT_TYPE_WEIGHTS)?,
            user_actions: WeightedChoice::new("user_action", &USER_ACTION_WEIGHTS)?,
            product_categories: WeightedChoice::new(
                "product_category",
                &PRODUCT_CATEGORY_WEIGHTS,
            )?,
            locations: WeightedChoice::new("location", &LOCATION_WEIGHTS)?,
            age: Normal::new(MEAN_AGE, AGE_STD_DEV)?,
        })
    }

    pub fn generate_event_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> ClickstreamEvent {
        let event_type = self.event_types.choose(rng);
        let user_action = self.user_actions.choose(rng);
        let location = self.locations.choose(rng).to_string();
        let user_age = self.age.sample(rng).round().clamp(MIN_AGE, MAX_AGE) as u8;
        let product_category = event_type
            .has_product_category()
            .then(|| self.product_categories.choose(rng));
        let timestamp = random_timestamp(rng, now);

        ClickstreamEvent {
            event_type,
            user_id: random_user_id(rng),
            user_action,
            product_category,
            location,
            user_age,
            timestamp,
        }
    }
}

impl EventGenerator for RandomEventGenerator {
    fn generate_event(&self) -> ClickstreamEvent {
        self.generate_event_with(&mut rand::thread_rng(), Utc::now())
    }
}

fn random_user_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..USER_ID_LENGTH)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Epoch seconds drawn uniformly from the `LOOKBACK_DAYS` days before `now`.
fn random_timestamp<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> i64 {
    let start = now - Duration::days(LOOKBACK_DAYS);
    let window_ms = (now - start).num_milliseconds() as f64;
    let offset = Duration::milliseconds((window_ms * rng.gen::<f64>()) as i64);

    (start + offset).timestamp()
}
