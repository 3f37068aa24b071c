//! Start offers: the cheapest places to launch a new instance right now.
//!
//! Depends on four categories fetched in order (images, key pairs, security
//! groups, spot prices). The newest available image is launched with the
//! single key pair and security group selected by the configured patterns,
//! at the cheapest zone average scaled by the bid multiplier.

use crate::context::Engine;
use crate::orchestrator::aged_title;
use chrono::{DateTime, Utc};
use spotdeck_core::resources::{
    decode_images, decode_key_pairs, decode_price_history, decode_security_groups, Image,
    KeyPair, PriceSample, SecurityGroup,
};
use spotdeck_core::{
    format_price, latest_image, rank_matching, select_key_pair, select_security_group,
    suggest_bid, ActionLink, ActionRequest, Category, Fragment, Notice, Row, SelectionError,
    Table,
};

impl Engine {
    pub(crate) async fn offer_fragments(&mut self, now: DateTime<Utc>) -> Vec<Fragment> {
        self.refresh::<Vec<Image>>(now, decode_images).await;
        self.refresh::<Vec<KeyPair>>(now, decode_key_pairs).await;
        self.refresh::<Vec<SecurityGroup>>(now, decode_security_groups).await;
        self.refresh::<Vec<PriceSample>>(now, decode_price_history).await;
        self.build_offers(now)
    }

    fn build_offers(&self, now: DateTime<Utc>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let images = self.cached::<Vec<Image>>(now, &mut out);
        let keys = self.cached::<Vec<KeyPair>>(now, &mut out);
        let groups = self.cached::<Vec<SecurityGroup>>(now, &mut out);
        let prices = self.cached::<Vec<PriceSample>>(now, &mut out);
        let (Some(images), Some(keys), Some(groups), Some(prices)) = (images, keys, groups, prices)
        else {
            return out;
        };

        let selectors = self.selectors();
        let image = latest_image(images.value()).ok_or(SelectionError::NoImage);
        let key = select_key_pair(&selectors.key_pair, keys.value());
        let group = select_security_group(&selectors.security_group, groups.value());

        let (image, key, group) = match (image, key, group) {
            (Ok(image), Ok(key), Ok(group)) => (image, key, group),
            (image, key, group) => {
                let errors = [image.err(), key.err(), group.err()];
                for error in errors.into_iter().flatten() {
                    tracing::warn!(error = %error, "start offers blocked");
                    out.push(Notice::error(error.to_string()).into());
                }
                return out;
            }
        };

        let config = self.config();
        let mut table = Table::new(
            format!(
                "{} from {} with {} / {}",
                aged_title(Category::SpotPrices, &prices, now),
                image.id,
                key.name,
                group.name
            ),
            ["Type", "Zone", "Average", "Bid", "Samples"],
        );

        let offers = rank_matching(prices.value(), &selectors.instance_type)
            .into_iter()
            .map(|quote| {
                let bid = suggest_bid(quote.cheapest.average, config.bid_multiplier);
                (quote, bid)
            })
            .filter(|(_, bid)| *bid > 0.0)
            .take(config.max_offers);

        for (quote, bid) in offers {
            let start = ActionRequest::Start {
                instance_type: quote.instance_type.clone(),
                price: format_price(bid),
                zone: quote.cheapest.zone.clone(),
                image_id: image.id.clone(),
                key_name: key.name.clone(),
                security_group_id: group.id.clone(),
            };
            table.push(
                Row::new([
                    quote.instance_type.clone(),
                    quote.cheapest.zone.clone(),
                    format_price(quote.cheapest.average),
                    format_price(bid),
                    quote.cheapest.samples.to_string(),
                ])
                .with_action(ActionLink::new("start", &start)),
            );
        }

        if table.is_empty() {
            out.push(
                Notice::info(format!(
                    "No spot prices match instance types {:?}",
                    selectors.instance_type.as_str()
                ))
                .into(),
            );
        } else {
            out.push(table.into());
        }
        out
    }
}
