use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::geo::GeoPoint;
use crate::hash::pick_index;
use crate::map::City;

/// Mean Earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0088;
/// Points for a perfect guess; every 2 km of error costs one point
const MAX_ROUND_POINTS: f64 = 5000.0;

/// The city to find this round
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Opaque image reference shown as the hint
    pub image: String,
}

impl Challenge {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Hands out challenges; may block, so it runs off the UI thread
pub trait ChallengeSource: Send + Sync {
    fn next_challenge(&self) -> Result<Challenge>;
}

/// Great-circle distance provider
pub trait DistanceService {
    fn distance_km(&self, a: GeoPoint, b: GeoPoint) -> Result<f64>;
}

/// Picks challenges from the loaded city list
pub struct LocalChallenges {
    cities: Vec<City>,
    seed: u64,
    draws: AtomicU64,
}

impl LocalChallenges {
    pub fn new(cities: Vec<City>, seed: u64) -> Self {
        Self {
            cities,
            seed,
            draws: AtomicU64::new(0),
        }
    }
}

impl ChallengeSource for LocalChallenges {
    fn next_challenge(&self) -> Result<Challenge> {
        let draw = self.draws.fetch_add(1, Ordering::Relaxed);
        let idx = pick_index(self.seed, draw, self.cities.len()).context("no cities to pick from")?;
        let city = &self.cities[idx];
        Ok(Challenge {
            city: city.name.clone(),
            country: city.country.clone().unwrap_or_default(),
            latitude: city.location.lat,
            longitude: city.location.lon,
            image: format!("cities/{}.jpg", city.name.to_lowercase().replace(' ', "_")),
        })
    }
}

/// Haversine distance computed in-process
#[derive(Clone, Copy, Debug, Default)]
pub struct Haversine;

impl DistanceService for Haversine {
    fn distance_km(&self, a: GeoPoint, b: GeoPoint) -> Result<f64> {
        let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (b.lon - a.lon).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        Ok(2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin())
    }
}

/// Points for a guess `distance_km` away, never negative
pub fn round_score(distance_km: f64) -> u32 {
    (MAX_ROUND_POINTS - distance_km * 0.5).max(0.0).floor() as u32
}

type Tagged = (u64, Result<Challenge>);

/// Runs challenge requests on worker threads. Every request and reset bumps
/// the generation; replies tagged with an older generation are dropped.
pub struct ChallengeFetcher {
    tx: Sender<Tagged>,
    rx: Receiver<Tagged>,
    generation: u64,
    discarded: u64,
}

impl ChallengeFetcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            discarded: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replies dropped so far for being out of date
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Ask `source` for a new challenge; supersedes anything in flight
    pub fn request(&mut self, source: Arc<dyn ChallengeSource>) -> Result<u64> {
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        thread::Builder::new()
            .name("challenge-fetch".into())
            .spawn(move || {
                let _ = tx.send((generation, source.next_challenge()));
            })
            .context("spawning challenge fetch")?;
        Ok(generation)
    }

    /// Forget whatever is in flight
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Latest reply for the current generation, if one has arrived
    pub fn poll(&mut self) -> Option<Result<Challenge>> {
        while let Ok((generation, reply)) = self.rx.try_recv() {
            if generation == self.generation {
                return Some(reply);
            }
            self.discarded += 1;
            log::debug!("discarding stale challenge (gen {generation}, now {})", self.generation);
        }
        None
    }
}

impl Default for ChallengeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChallengeState {
    /// Nothing requested ("no image" placeholder)
    #[default]
    Empty,
    /// Request in flight ("generating" placeholder)
    Pending,
    Ready(Challenge),
}

/// Outcome of one submitted guess
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub challenge: Challenge,
    pub distance_km: f64,
    pub points: u32,
    pub round: u32,
    pub total_score: u32,
}

/// Round bookkeeping around the map: which city is being guessed, how far
/// off the guess was, and the running score.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub max_rounds: u32,
    round: u32,
    total_score: u32,
    challenge: ChallengeState,
    last_result: Option<RoundResult>,
    guess_locked: bool,
    finished: bool,
}

impl GameSession {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds,
            round: 0,
            total_score: 0,
            challenge: ChallengeState::Empty,
            last_result: None,
            guess_locked: false,
            finished: false,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn challenge(&self) -> &ChallengeState {
        &self.challenge
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn can_submit(&self) -> bool {
        !self.guess_locked && matches!(self.challenge, ChallengeState::Ready(_))
    }

    /// Where the answer marker goes for the current challenge
    pub fn answer(&self) -> Option<GeoPoint> {
        match &self.challenge {
            ChallengeState::Ready(c) => Some(c.location()),
            _ => None,
        }
    }

    fn start_new_game(&mut self) {
        self.round = 0;
        self.total_score = 0;
        self.finished = false;
    }

    /// Back to a fresh game with no challenge
    pub fn reset(&mut self) {
        self.start_new_game();
        self.challenge = ChallengeState::Empty;
        self.last_result = None;
        self.guess_locked = false;
    }

    /// A challenge was requested; a finished game rolls over into a new one
    pub fn begin_challenge(&mut self) {
        if self.finished {
            self.start_new_game();
        }
        self.challenge = ChallengeState::Pending;
        self.last_result = None;
        self.guess_locked = false;
    }

    pub fn challenge_arrived(&mut self, challenge: Challenge) {
        self.challenge = ChallengeState::Ready(challenge);
    }

    pub fn challenge_failed(&mut self) {
        self.challenge = ChallengeState::Empty;
    }

    /// Score `guess` against the current challenge. `Ok(None)` when there is
    /// nothing to score: no challenge, no guess, or already submitted.
    pub fn submit(&mut self, guess: Option<GeoPoint>, service: &dyn DistanceService) -> Result<Option<RoundResult>> {
        let (ChallengeState::Ready(challenge), Some(guess)) = (&self.challenge, guess) else {
            return Ok(None);
        };
        if self.guess_locked {
            return Ok(None);
        }
        self.guess_locked = true;

        let distance_km = service.distance_km(challenge.location(), guess)?;
        let points = round_score(distance_km);
        self.round += 1;
        self.total_score += points;
        if self.round >= self.max_rounds {
            self.finished = true;
        }

        let result = RoundResult {
            challenge: challenge.clone(),
            distance_km,
            points,
            round: self.round,
            total_score: self.total_score,
        };
        log::info!(
            "round {}: {} at {:.2} km, {} points",
            result.round,
            result.challenge.city,
            distance_km,
            points
        );
        self.last_result = Some(result.clone());
        Ok(Some(result))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::gated;
    use super::*;
    use std::time::{Duration, Instant};

    fn tokyo() -> Challenge {
        Challenge {
            city: "Tokyo".into(),
            country: "Japan".into(),
            latitude: 35.68,
            longitude: 139.69,
            image: "tokyo.jpg".into(),
        }
    }

    struct Fixed(f64);

    impl DistanceService for Fixed {
        fn distance_km(&self, _: GeoPoint, _: GeoPoint) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct Constant(Challenge);

    impl ChallengeSource for Constant {
        fn next_challenge(&self) -> Result<Challenge> {
            Ok(self.0.clone())
        }
    }

    fn wait_for(fetcher: &mut ChallengeFetcher) -> Option<Result<Challenge>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(reply) = fetcher.poll() {
                return Some(reply);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.0), 5000);
        assert_eq!(round_score(1.5), 4999);
        assert_eq!(round_score(2000.0), 4000);
        assert_eq!(round_score(10_000.0), 0);
        assert_eq!(round_score(20_000.0), 0);
    }

    #[test]
    fn test_haversine() {
        let km = Haversine
            .distance_km(GeoPoint::new(48.8566, 2.3522), GeoPoint::new(51.5074, -0.1278))
            .unwrap();
        assert!((km - 343.5).abs() < 2.0, "{km}");
        let zero = Haversine.distance_km(GeoPoint::new(10.0, 10.0), GeoPoint::new(10.0, 10.0)).unwrap();
        assert!(zero.abs() < 1e-9);
    }

    #[test]
    fn test_submit_requires_challenge_and_guess() {
        let mut game = GameSession::new(5);
        assert_eq!(game.submit(Some(GeoPoint::new(0.0, 0.0)), &Fixed(1.0)).unwrap(), None);
        game.begin_challenge();
        game.challenge_arrived(tokyo());
        assert_eq!(game.submit(None, &Fixed(1.0)).unwrap(), None);
        assert_eq!(game.round(), 0);
    }

    #[test]
    fn test_submit_scores_and_locks() {
        let mut game = GameSession::new(5);
        game.begin_challenge();
        game.challenge_arrived(tokyo());
        assert!(game.can_submit());
        let result = game.submit(Some(GeoPoint::new(0.0, 0.0)), &Fixed(1000.0)).unwrap().unwrap();
        assert_eq!(result.points, 4500);
        assert_eq!(result.round, 1);
        assert_eq!(game.total_score(), 4500);
        assert!(!game.can_submit());
        assert_eq!(game.submit(Some(GeoPoint::new(0.0, 0.0)), &Fixed(0.0)).unwrap(), None);
        assert_eq!(game.answer(), Some(tokyo().location()));
    }

    #[test]
    fn test_game_finishes_and_rolls_over() {
        let mut game = GameSession::new(2);
        for _ in 0..2 {
            game.begin_challenge();
            game.challenge_arrived(tokyo());
            game.submit(Some(GeoPoint::new(0.0, 0.0)), &Fixed(0.0)).unwrap();
        }
        assert!(game.is_finished());
        assert_eq!(game.total_score(), 10_000);
        game.begin_challenge();
        assert!(!game.is_finished());
        assert_eq!(game.round(), 0);
        assert_eq!(game.total_score(), 0);
        assert_eq!(game.challenge(), &ChallengeState::Pending);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut game = GameSession::new(5);
        game.begin_challenge();
        game.challenge_arrived(tokyo());
        game.submit(Some(GeoPoint::new(0.0, 0.0)), &Fixed(10.0)).unwrap();
        game.reset();
        assert_eq!(game.challenge(), &ChallengeState::Empty);
        assert!(game.last_result().is_none());
        assert_eq!(game.round(), 0);
    }

    #[test]
    fn test_local_challenges_pick_loaded_city() {
        let cities = vec![City {
            name: "Mexico City".into(),
            location: GeoPoint::new(19.4, -99.1),
            population: 21_800_000,
            country: Some("Mexico".into()),
        }];
        let source = LocalChallenges::new(cities, 3);
        let c = source.next_challenge().unwrap();
        assert_eq!(c.city, "Mexico City");
        assert_eq!(c.image, "cities/mexico_city.jpg");
        assert!(LocalChallenges::new(Vec::new(), 3).next_challenge().is_err());
    }

    #[test]
    fn test_fetcher_delivers_current_generation() {
        let mut fetcher = ChallengeFetcher::new();
        let gen = fetcher.request(Arc::new(Constant(tokyo()))).unwrap();
        assert_eq!(gen, fetcher.generation());
        let reply = wait_for(&mut fetcher).unwrap().unwrap();
        assert_eq!(reply, tokyo());
    }

    #[test]
    fn test_fetcher_drops_stale_reply() {
        let mut fetcher = ChallengeFetcher::new();
        let (source, release) = gated(tokyo());
        fetcher.request(source).unwrap();
        fetcher.invalidate();
        release.send(()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while fetcher.discarded() == 0 {
            assert!(fetcher.poll().is_none(), "stale reply was delivered");
            assert!(Instant::now() < deadline, "stale reply never arrived");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(fetcher.discarded(), 1);
        assert!(fetcher.poll().is_none());
    }

    #[test]
    fn test_fetcher_newer_request_supersedes_older() {
        let mut fetcher = ChallengeFetcher::new();
        let (slow, release) = gated(tokyo());
        fetcher.request(slow).unwrap();
        let mut osaka = tokyo();
        osaka.city = "Osaka".into();
        fetcher.request(Arc::new(Constant(osaka.clone()))).unwrap();

        assert_eq!(wait_for(&mut fetcher).unwrap().unwrap(), osaka);
        release.send(()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while fetcher.discarded() == 0 {
            assert!(fetcher.poll().is_none(), "older reply was delivered");
            assert!(Instant::now() < deadline, "older reply never arrived");
            thread::sleep(Duration::from_millis(1));
        }
    }
}
