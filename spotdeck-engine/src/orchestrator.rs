//! Refresh passes.
//!
//! A pass runs its preceding action (if any), forces the categories it
//! invalidates, then walks the categories in declared order: instances,
//! spot requests, then the start offers. Each category either serves its
//! cached value or fetches; a failure in one never stops the others.

use crate::context::Engine;
use crate::dispatcher;
use crate::gateway::{GatewayCall, Operation};
use crate::pass::RefreshPass;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use spotdeck_core::action::ABSENT;
use spotdeck_core::config::MAX_PRICE_WINDOW_HOURS;
use spotdeck_core::resources::{decode_instances, decode_spot_requests, Instance, SpotRequest};
use spotdeck_core::{
    ActionLink, ActionRequest, Category, DecodeError, Fragment, Notice, PanelConfig, RenderedView,
    Row, SpotdeckError, Table,
};
use spotdeck_storage::{format_age, CacheRead, Cacheable};

/// The read call for one category.
pub fn fetch_call(category: Category, config: &PanelConfig, now: DateTime<Utc>) -> GatewayCall {
    match category {
        Category::Instances => GatewayCall::new(Operation::DescribeInstances).arg(
            "Filters",
            json!([{ "Name": "instance-state-name", "Values": ["running"] }]),
        ),
        Category::SpotRequests => GatewayCall::new(Operation::DescribeSpotInstanceRequests).arg(
            "Filters",
            json!([{ "Name": "state", "Values": ["open", "fulfilled"] }]),
        ),
        Category::Images => GatewayCall::new(Operation::DescribeImages)
            .arg("Owners", json!([config.image_owner])),
        Category::KeyPairs => GatewayCall::new(Operation::DescribeKeyPairs),
        Category::SecurityGroups => GatewayCall::new(Operation::DescribeSecurityGroups),
        Category::SpotPrices => {
            // Clamped so an unvalidated config cannot push the start off the calendar.
            let hours = config.price_window_hours.min(MAX_PRICE_WINDOW_HOURS) as i64;
            let start = chrono::Duration::try_hours(hours)
                .and_then(|window| now.checked_sub_signed(window))
                .unwrap_or(now);
            GatewayCall::new(Operation::DescribeSpotPriceHistory)
                .arg("StartTime", start.to_rfc3339_opts(SecondsFormat::Secs, true))
                .arg("ProductDescriptions", json!([config.product_description]))
        }
    }
}

/// Table title carrying the age of the data shown.
pub(crate) fn aged_title<V>(category: Category, read: &CacheRead<'_, V>, now: DateTime<Utc>) -> String {
    format!(
        "{} (updated {} ago)",
        category.title(),
        format_age(read.staleness_at(now))
    )
}

impl Engine {
    pub async fn run_pass(&mut self, pass: RefreshPass) -> RenderedView {
        self.run_pass_at(pass, Utc::now()).await
    }

    /// Run one pass with `now` as the cache clock.
    pub async fn run_pass_at(&mut self, pass: RefreshPass, now: DateTime<Utc>) -> RenderedView {
        let RefreshPass {
            preceding_action,
            mut invalidated,
        } = pass;
        let mut fragments = Vec::new();

        if let Some(action) = preceding_action {
            let outcome = dispatcher::execute_at(self, &action, now).await;
            if let Some(category) = outcome.invalidate {
                invalidated.insert(category);
            }
            fragments.push(outcome.fragment);
        }

        for &category in &invalidated {
            self.cache_mut().force_refetch(category);
        }

        self.refresh::<Vec<Instance>>(now, decode_instances).await;
        fragments.extend(self.instance_fragments(now));

        self.refresh::<Vec<SpotRequest>>(now, decode_spot_requests).await;
        fragments.extend(self.spot_request_fragments(now));

        fragments.extend(self.offer_fragments(now).await);

        let sequence = self.next_sequence();
        tracing::info!(
            sequence,
            fragments = fragments.len(),
            forced = invalidated.len(),
            "refresh pass complete"
        );
        RenderedView {
            sequence,
            built_at: now,
            fragments,
        }
    }

    /// Fetch one category if the cache says so, recording the outcome.
    pub(crate) async fn refresh<V: Cacheable>(
        &mut self,
        now: DateTime<Utc>,
        decode: fn(Value) -> Result<V, DecodeError>,
    ) {
        let category = V::CATEGORY;
        if !self.cache_mut().should_fetch_at(category, now) {
            return;
        }

        tracing::info!(category = %category, "fetching");
        let call = fetch_call(category, self.config(), now);
        let result = match self.invoke(call).await {
            Ok(raw) => decode(raw).map_err(SpotdeckError::from),
            Err(e) => Err(SpotdeckError::from(e)),
        };

        match result {
            Ok(value) => self.cache_mut().record_at(value, now),
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "fetch failed, keeping previous value");
                self.cache_mut().record_failure(category, e);
            }
        }
    }

    /// The cached value for `V`, pushing a notice when it is stale or missing.
    pub(crate) fn cached<V: Cacheable>(
        &self,
        now: DateTime<Utc>,
        notices: &mut Vec<Fragment>,
    ) -> Option<CacheRead<'_, V>> {
        let category = V::CATEGORY;
        match self.cache().read::<V>() {
            Some(read) => {
                if read.is_stale() {
                    notices.push(
                        Notice::warning(format!(
                            "{} may be out of date (updated {} ago): {}",
                            category.title(),
                            format_age(read.staleness_at(now)),
                            read.error().unwrap_or("refresh failed"),
                        ))
                        .into(),
                    );
                }
                Some(read)
            }
            None => {
                let reason = self
                    .cache()
                    .state(category)
                    .last_error()
                    .unwrap_or("not fetched yet");
                notices.push(
                    Notice::error(format!("{} unavailable: {}", category.title(), reason)).into(),
                );
                None
            }
        }
    }

    fn instance_fragments(&self, now: DateTime<Utc>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let Some(read) = self.cached::<Vec<Instance>>(now, &mut out) else {
            return out;
        };

        let mut table = Table::new(
            aged_title(Category::Instances, &read, now),
            ["Instance", "Type", "Address", "State", "Launched"],
        );
        for instance in read.value() {
            let address = instance.public_address.as_deref().unwrap_or(ABSENT);
            let snapshot = ActionRequest::Snapshot {
                instance_id: instance.id.clone(),
                instance_type: instance.instance_type.clone(),
                address: address.to_string(),
            };
            let terminate = ActionRequest::Terminate {
                instance_id: instance.id.clone(),
                instance_type: instance.instance_type.clone(),
                address: address.to_string(),
            };
            let launched = instance.launch_time.format("%Y-%m-%d %H:%M UTC").to_string();
            table.push(
                Row::new([
                    instance.id.as_str(),
                    instance.instance_type.as_str(),
                    address,
                    instance.state.as_str(),
                    launched.as_str(),
                ])
                .with_action(ActionLink::new("snapshot", &snapshot))
                .with_action(ActionLink::new("terminate", &terminate)),
            );
        }
        out.push(table.into());
        out
    }

    fn spot_request_fragments(&self, now: DateTime<Utc>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let Some(read) = self.cached::<Vec<SpotRequest>>(now, &mut out) else {
            return out;
        };

        let mut table = Table::new(
            aged_title(Category::SpotRequests, &read, now),
            ["Request", "Type", "Price", "State", "Status", "Instance"],
        );
        for request in read.value() {
            let cancel = ActionRequest::CancelBid {
                request_id: request.id.clone(),
                instance_type: request.instance_type.clone(),
            };
            table.push(
                Row::new([
                    request.id.as_str(),
                    request.instance_type.as_str(),
                    request.price.as_str(),
                    request.state.as_str(),
                    request.status_message.as_deref().unwrap_or(ABSENT),
                    request.instance_id.as_deref().unwrap_or(ABSENT),
                ])
                .with_action(ActionLink::new("cancel", &cancel)),
            );
        }
        out.push(table.into());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_price_history_window() {
        let config = PanelConfig {
            price_window_hours: 6,
            ..PanelConfig::default()
        };
        let call = fetch_call(Category::SpotPrices, &config, t0());
        assert_eq!(call.operation, Operation::DescribeSpotPriceHistory);
        assert_eq!(call.args["StartTime"], json!("2026-10-18T03:00:00Z"));
        assert_eq!(call.args["ProductDescriptions"], json!(["Linux/UNIX"]));
    }

    #[test]
    fn test_oversized_price_window_is_capped() {
        let config = PanelConfig {
            price_window_hours: 3_000_000_000,
            ..PanelConfig::default()
        };
        let call = fetch_call(Category::SpotPrices, &config, t0());
        assert_eq!(call.args["StartTime"], json!("2026-07-20T09:00:00Z"));
    }

    #[test]
    fn test_images_filtered_by_owner() {
        let call = fetch_call(Category::Images, &PanelConfig::default(), t0());
        assert_eq!(call.args["Owners"], json!(["self"]));
    }

    #[test]
    fn test_every_category_maps_to_a_read() {
        for &category in Category::all() {
            let call = fetch_call(category, &PanelConfig::default(), t0());
            assert!(!call.operation.is_mutating(), "{} must not mutate", category);
        }
    }
}
