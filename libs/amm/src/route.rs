//! Route selection across candidate pools
//!
//! `find_best_route` compares independent single-hop quotes for the same
//! input. `find_best_path` chains hops between assets, feeding each output
//! into the next leg, with depth bounded by `RouteConfig::max_hops`.

use crate::error::{MathError, MathResult};
use crate::pool::ConstantProductPool;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tidepool_config::protocol::MAX_ROUTE_HOPS;
use tidepool_config::RouteConfig;
use tracing::{debug, trace};

/// One traversable pool leg, oriented in the trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    pub pool_reserve_in: U256,
    pub pool_reserve_out: U256,
    pub fee_bps: U256,
}

impl RouteHop {
    pub fn new(pool_reserve_in: U256, pool_reserve_out: U256, fee_bps: U256) -> Self {
        Self {
            pool_reserve_in,
            pool_reserve_out,
            fee_bps,
        }
    }

    fn quote(&self, amount_in: U256) -> MathResult<U256> {
        ConstantProductPool::quote_swap(
            amount_in,
            self.pool_reserve_in,
            self.pool_reserve_out,
            self.fee_bps,
        )
        .map(|quote| quote.amount_out)
    }
}

/// Winning single hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSelection {
    pub hop_index: usize,
    pub amount_out: U256,
}

/// Asset identifier used to connect legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// A hop between two identified assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub hop: RouteHop,
}

/// Winning multi-hop path: indices into the leg list, in trade order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    pub legs: Vec<usize>,
    pub amount_out: U256,
}

/// Route search under a fixed depth limit
#[derive(Debug, Clone, Default)]
pub struct RouteOptimizer {
    config: RouteConfig,
}

impl RouteOptimizer {
    pub fn new(config: RouteConfig) -> Self {
        Self { config }
    }

    /// Effective depth limit, never above `MAX_ROUTE_HOPS`
    pub fn max_hops(&self) -> usize {
        self.config.max_hops.clamp(1, MAX_ROUTE_HOPS)
    }

    /// Best single hop for `amount_in`; the first listed hop wins ties
    ///
    /// Hops that cannot quote (empty reserves, zero output upstream) are
    /// skipped. Any other failure is returned as-is.
    pub fn find_best_route(amount_in: U256, hops: &[RouteHop]) -> MathResult<RouteSelection> {
        let mut best: Option<RouteSelection> = None;

        for (hop_index, hop) in hops.iter().enumerate() {
            let amount_out = match hop.quote(amount_in) {
                Ok(amount_out) => amount_out,
                Err(MathError::InsufficientLiquidity { context }) => {
                    trace!(hop_index, context, "skipping hop");
                    continue;
                }
                Err(err) => return Err(err),
            };

            if best.map_or(true, |current| amount_out > current.amount_out) {
                best = Some(RouteSelection {
                    hop_index,
                    amount_out,
                });
            }
        }

        let selection = best.ok_or(MathError::liquidity("no candidate hop can be quoted"))?;
        debug!(
            hop_index = selection.hop_index,
            amount_out = %selection.amount_out,
            candidates = hops.len(),
            "best route selected"
        );
        Ok(selection)
    }

    /// Best chain of legs from `from` to `to`, each leg used at most once
    ///
    /// Ties keep the shorter path, then the one found first.
    pub fn find_best_path(
        &self,
        amount_in: U256,
        from: AssetId,
        to: AssetId,
        legs: &[RouteLeg],
    ) -> MathResult<RoutePath> {
        if from == to {
            return Err(MathError::domain(
                "find_best_path",
                "source and destination assets are the same",
            ));
        }

        let mut search = PathSearch {
            legs,
            target: to,
            max_hops: self.max_hops(),
            used: vec![false; legs.len()],
            path: Vec::with_capacity(self.max_hops()),
            best: None,
        };
        search.extend(from, amount_in)?;

        let best = search
            .best
            .ok_or(MathError::liquidity("no route connects the requested assets"))?;
        debug!(
            hops = best.legs.len(),
            amount_out = %best.amount_out,
            "best path selected"
        );
        Ok(best)
    }
}

/// Depth-first search state for `find_best_path`
struct PathSearch<'a> {
    legs: &'a [RouteLeg],
    target: AssetId,
    max_hops: usize,
    used: Vec<bool>,
    path: Vec<usize>,
    best: Option<RoutePath>,
}

impl PathSearch<'_> {
    fn extend(&mut self, asset: AssetId, amount: U256) -> MathResult<()> {
        if self.path.len() == self.max_hops {
            return Ok(());
        }

        for index in 0..self.legs.len() {
            let leg = self.legs[index];
            if self.used[index] || leg.asset_in != asset {
                continue;
            }

            let amount_out = match leg.hop.quote(amount) {
                Ok(amount_out) => amount_out,
                Err(MathError::InsufficientLiquidity { .. }) => continue,
                Err(err) => return Err(err),
            };

            self.used[index] = true;
            self.path.push(index);

            if leg.asset_out == self.target {
                self.record(amount_out);
            } else {
                self.extend(leg.asset_out, amount_out)?;
            }

            self.path.pop();
            self.used[index] = false;
        }
        Ok(())
    }

    fn record(&mut self, amount_out: U256) {
        let improves = match &self.best {
            None => true,
            Some(best) => {
                amount_out > best.amount_out
                    || (amount_out == best.amount_out && self.path.len() < best.legs.len())
            }
        };
        if improves {
            self.best = Some(RoutePath {
                legs: self.path.clone(),
                amount_out,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::from_whole;

    fn hop(reserve_in: u64, reserve_out: u64, fee_bps: u64) -> RouteHop {
        RouteHop::new(
            from_whole(reserve_in),
            from_whole(reserve_out),
            U256::from(fee_bps),
        )
    }

    fn leg(asset_in: u64, asset_out: u64, hop: RouteHop) -> RouteLeg {
        RouteLeg {
            asset_in: AssetId(asset_in),
            asset_out: AssetId(asset_out),
            hop,
        }
    }

    #[test]
    fn test_deeper_pool_wins() {
        let hops = [hop(1_000, 1_000, 30), hop(100_000, 100_000, 30)];
        let amount_in = from_whole(10);

        let selection = RouteOptimizer::find_best_route(amount_in, &hops).unwrap();
        let expected = ConstantProductPool::quote_swap(
            amount_in,
            hops[1].pool_reserve_in,
            hops[1].pool_reserve_out,
            hops[1].fee_bps,
        )
        .unwrap()
        .amount_out;

        assert_eq!(selection.hop_index, 1);
        assert_eq!(selection.amount_out, expected);
    }

    #[test]
    fn test_tie_goes_to_first_hop() {
        let hops = [hop(5_000, 5_000, 30), hop(5_000, 5_000, 30), hop(5_000, 5_000, 30)];
        let selection = RouteOptimizer::find_best_route(from_whole(1), &hops).unwrap();
        assert_eq!(selection.hop_index, 0);
    }

    #[test]
    fn test_empty_pools_are_skipped() {
        let hops = [
            RouteHop::new(U256::zero(), from_whole(10), U256::from(30u64)),
            hop(1_000, 2_000, 30),
        ];
        let selection = RouteOptimizer::find_best_route(from_whole(1), &hops).unwrap();
        assert_eq!(selection.hop_index, 1);
    }

    #[test]
    fn test_no_quotable_hop() {
        assert!(matches!(
            RouteOptimizer::find_best_route(from_whole(1), &[]),
            Err(MathError::InsufficientLiquidity { .. })
        ));
        let empty = [RouteHop::new(U256::zero(), U256::zero(), U256::zero())];
        assert!(matches!(
            RouteOptimizer::find_best_route(from_whole(1), &empty),
            Err(MathError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_lopsided_hop_does_not_abort_search() {
        let amount_in = U256::from(10_000u64);
        let hops = [
            RouteHop::new(U256::from(1_000u64), U256::MAX / 2, U256::from(30u64)),
            RouteHop::new(U256::from(1_000_000u64), U256::from(1_000_000u64), U256::from(30u64)),
        ];
        let selection = RouteOptimizer::find_best_route(amount_in, &hops).unwrap();
        assert_eq!(selection.hop_index, 0);
        assert_eq!(selection.amount_out, hops[0].quote(amount_in).unwrap());

        let legs = [leg(1, 2, hops[1]), leg(1, 2, hops[0])];
        let path = RouteOptimizer::default()
            .find_best_path(amount_in, AssetId(1), AssetId(2), &legs)
            .unwrap();
        assert_eq!(path.legs, vec![1]);
    }

    #[test]
    fn test_invalid_fee_propagates() {
        let hops = [hop(1_000, 1_000, 30), hop(1_000, 1_000, 20_000)];
        assert!(matches!(
            RouteOptimizer::find_best_route(from_whole(1), &hops),
            Err(MathError::DomainError { .. })
        ));
    }

    #[test]
    fn test_two_hop_path_beats_shallow_direct_pool() {
        // 1 -> 3 directly through a thin pool, or 1 -> 2 -> 3 through deep pools
        let legs = [
            leg(1, 3, hop(100, 100, 30)),
            leg(1, 2, hop(1_000_000, 1_000_000, 30)),
            leg(2, 3, hop(1_000_000, 1_000_000, 30)),
        ];
        let optimizer = RouteOptimizer::default();
        let path = optimizer
            .find_best_path(from_whole(50), AssetId(1), AssetId(3), &legs)
            .unwrap();
        assert_eq!(path.legs, vec![1, 2]);

        let first = legs[1].hop.quote(from_whole(50)).unwrap();
        let second = legs[2].hop.quote(first).unwrap();
        assert_eq!(path.amount_out, second);
    }

    #[test]
    fn test_direct_path_preferred_when_better() {
        let legs = [
            leg(1, 2, hop(1_000, 1_000, 30)),
            leg(2, 3, hop(1_000, 1_000, 30)),
            leg(1, 3, hop(1_000_000, 1_000_000, 30)),
        ];
        let path = RouteOptimizer::default()
            .find_best_path(from_whole(10), AssetId(1), AssetId(3), &legs)
            .unwrap();
        assert_eq!(path.legs, vec![2]);
    }

    #[test]
    fn test_path_depth_is_bounded() {
        // Only a three-leg chain connects 1 to 4
        let legs = [
            leg(1, 2, hop(10_000, 10_000, 30)),
            leg(2, 3, hop(10_000, 10_000, 30)),
            leg(3, 4, hop(10_000, 10_000, 30)),
        ];

        let shallow = RouteOptimizer::new(RouteConfig { max_hops: 2 });
        assert!(matches!(
            shallow.find_best_path(from_whole(1), AssetId(1), AssetId(4), &legs),
            Err(MathError::InsufficientLiquidity { .. })
        ));

        let deep = RouteOptimizer::new(RouteConfig { max_hops: 3 });
        let path = deep
            .find_best_path(from_whole(1), AssetId(1), AssetId(4), &legs)
            .unwrap();
        assert_eq!(path.legs, vec![0, 1, 2]);
    }

    #[test]
    fn test_max_hops_clamped() {
        let optimizer = RouteOptimizer::new(RouteConfig { max_hops: 50 });
        assert_eq!(optimizer.max_hops(), MAX_ROUTE_HOPS);
    }

    #[test]
    fn test_same_asset_rejected() {
        let legs = [leg(1, 2, hop(10, 10, 30))];
        assert!(matches!(
            RouteOptimizer::default().find_best_path(from_whole(1), AssetId(1), AssetId(1), &legs),
            Err(MathError::DomainError { .. })
        ));
    }
}
