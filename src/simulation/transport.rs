//! Packet sockets and constant-bit-rate traffic over the reference substrate.
//!
//! A transmission is evaluated independently at the frame's destination and at
//! every node holding a bound socket (sockets see every frame their node's
//! radio decodes). Decoded frames arrive one airtime after they were sent.
//! Sockets are promiscuous: the vantage socket on node 1 counts the frames it
//! overhears on their way to node 0, not only frames addressed to node 1.
//! Only the destination's outcome is fed back to the sender's rate controller.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::time::Duration;

use super::energy::{EnergyModel, EnergyObserver};
use super::mobility::MobilityModel;
use super::rate_control::{RateController, TxOutcome};
use super::scheduler::Scheduler;
use super::signal_calculations::{calculate_air_time, calculate_snr, is_decodable};
use super::types::{DataMode, NodeId};
use super::wifi::WifiConfig;

/// Handle of a bound packet socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(usize);

/// A frame on its way to one receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub payload_size: u32,
    pub mode: DataMode,
    pub airtime: Duration,
}

/// Events the transport schedules for itself.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Generator `generator` sends its next packet.
    Transmit { generator: usize },
    /// `frame` finished arriving at its receiver.
    Arrival { frame: Frame },
}

/// Bytes handed to a socket's receive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub socket: SocketHandle,
    pub bytes: u32,
}

/// Counters for the run log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub frames_sent: u64,
    pub frames_lost_at_destination: u64,
    pub arrivals: u64,
}

#[derive(Debug, Clone)]
struct Socket {
    node: NodeId,
}

/// On/off application in permanent "on" state between `start` and `stop`.
#[derive(Debug, Clone)]
struct OnOffGenerator {
    node: NodeId,
    destination: NodeId,
    payload_size: u32,
    interval: Duration,
    stop: Duration,
}

/// Sockets, generators and rate controllers of one run.
pub struct PacketTransport {
    config: WifiConfig,
    sockets: Vec<Socket>,
    generators: Vec<OnOffGenerator>,
    controllers: HashMap<(NodeId, NodeId), RateController>,
    rng: StdRng,
    stats: TransportStats,
}

impl PacketTransport {
    /// Install packet sockets and devices configured by `config`. `seed`
    /// drives the shadowing samples of this run.
    pub fn install(config: &WifiConfig, seed: u64) -> Self {
        Self {
            config: config.clone(),
            sockets: Vec::new(),
            generators: Vec::new(),
            controllers: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            stats: TransportStats::default(),
        }
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Create a socket on `node` bound to every protocol and device.
    pub fn bind(&mut self, node: NodeId) -> SocketHandle {
        self.sockets.push(Socket { node });
        SocketHandle(self.sockets.len() - 1)
    }

    /// Install a constant-bit-rate generator on `node` sending to `destination`.
    ///
    /// Packets leave every `payload_size * 8 / data_rate_bps` seconds; the first
    /// one leaves one interval after `start` and none at or after `stop`.
    #[allow(clippy::too_many_arguments)]
    pub fn send_constant_rate<E: From<TransportEvent>>(
        &mut self,
        scheduler: &mut Scheduler<E>,
        node: NodeId,
        destination: NodeId,
        data_rate_bps: u64,
        payload_size: u32,
        start: Duration,
        stop: Duration,
    ) {
        let interval = Duration::from_secs_f64(payload_size as f64 * 8.0 / data_rate_bps as f64);
        let generator = self.generators.len();
        self.generators.push(OnOffGenerator {
            node,
            destination,
            payload_size,
            interval,
            stop,
        });

        let first = start + interval;
        if first < stop {
            let delay = first.saturating_sub(scheduler.now());
            scheduler.schedule(delay, node, TransportEvent::Transmit { generator }.into());
        }
    }

    /// Process one transport event and return the resulting socket deliveries.
    pub fn handle_event<E: From<TransportEvent>>(
        &mut self,
        event: TransportEvent,
        scheduler: &mut Scheduler<E>,
        mobility: &dyn MobilityModel,
        energy: &mut EnergyModel,
        observer: &mut dyn EnergyObserver,
    ) -> Vec<Delivery> {
        match event {
            TransportEvent::Transmit { generator } => {
                self.transmit(generator, scheduler, mobility, energy, observer);
                Vec::new()
            }
            TransportEvent::Arrival { frame } => {
                self.stats.arrivals += 1;
                energy.on_receive(scheduler.now(), frame.receiver, frame.airtime, observer);
                self.sockets
                    .iter()
                    .enumerate()
                    .filter(|(_, socket)| socket.node == frame.receiver)
                    .map(|(index, _)| Delivery {
                        socket: SocketHandle(index),
                        bytes: frame.payload_size,
                    })
                    .collect()
            }
        }
    }

    fn transmit<E: From<TransportEvent>>(
        &mut self,
        generator: usize,
        scheduler: &mut Scheduler<E>,
        mobility: &dyn MobilityModel,
        energy: &mut EnergyModel,
        observer: &mut dyn EnergyObserver,
    ) {
        let now = scheduler.now();
        let OnOffGenerator {
            node,
            destination,
            payload_size,
            interval,
            stop,
        } = self.generators[generator].clone();
        if now >= stop {
            return;
        }

        let config = &self.config;
        let controller = self
            .controllers
            .entry((node, destination))
            .or_insert_with(|| RateController::new(config.rate_control, config.standard, config.data_mode));
        let mode = controller.current_mode();
        let airtime = calculate_air_time(mode, payload_size);
        energy.on_transmit(now, node, airtime, observer);
        self.stats.frames_sent += 1;

        let sender_position = mobility.position(node);
        let frame_to = |receiver: NodeId| Frame {
            sender: node,
            receiver,
            payload_size,
            mode,
            airtime,
        };

        let destination_snr = calculate_snr(sender_position.distance_to(&mobility.position(destination)), &config.channel, &mut self.rng);
        let delivered = is_decodable(destination_snr, mode);
        controller.report(TxOutcome {
            delivered,
            snr: destination_snr,
        });
        if delivered {
            scheduler.schedule(airtime, destination, TransportEvent::Arrival { frame: frame_to(destination) }.into());
        } else {
            self.stats.frames_lost_at_destination += 1;
        }

        let mut listeners: Vec<NodeId> = self.sockets.iter().map(|socket| socket.node).collect();
        listeners.sort_unstable();
        listeners.dedup();
        for listener in listeners {
            if listener == node || listener == destination {
                continue;
            }
            let snr = calculate_snr(sender_position.distance_to(&mobility.position(listener)), &config.channel, &mut self.rng);
            if is_decodable(snr, mode) {
                scheduler.schedule(airtime, listener, TransportEvent::Arrival { frame: frame_to(listener) }.into());
            }
        }

        if now + interval < stop {
            scheduler.schedule(interval, node, TransportEvent::Transmit { generator }.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::energy::NullEnergyObserver;
    use crate::simulation::mobility::ConstantPositionMobility;
    use crate::simulation::types::Position;

    fn run_transport(transport: &mut PacketTransport, scheduler: &mut Scheduler<TransportEvent>, mobility: &ConstantPositionMobility) -> Vec<(Duration, Delivery)> {
        let mut energy = EnergyModel::none();
        let mut observer = NullEnergyObserver;
        let mut deliveries = Vec::new();
        scheduler.run_until_idle(|s, _, event| {
            for delivery in transport.handle_event(event, s, mobility, &mut energy, &mut observer) {
                deliveries.push((s.now(), delivery));
            }
        });
        deliveries
    }

    #[test]
    fn generator_window_bounds_packet_count() {
        let mobility = ConstantPositionMobility::install([Position::new(0.0, 0.0, 0.0), Position::new(5.0, 0.0, 0.0)]);
        let mut transport = PacketTransport::install(&WifiConfig::default(), 1);
        let mut scheduler = Scheduler::new();
        let socket = transport.bind(0);

        // 200 bytes at 6000 bps: one packet every 266.67 ms, first at 0.3667 s.
        transport.send_constant_rate(&mut scheduler, 1, 0, 6000, 200, Duration::from_millis(100), Duration::from_secs(2));
        let deliveries = run_transport(&mut transport, &mut scheduler, &mobility);

        // Departures at 0.1 + k * 0.2667 < 2.0 for k = 1..=7.
        assert_eq!(deliveries.len(), 7);
        assert!(deliveries.iter().all(|(_, d)| d.socket == socket && d.bytes == 200));
        assert!(deliveries[0].0 > Duration::from_millis(366));
        assert!(deliveries[0].0 < Duration::from_millis(368));
        assert_eq!(transport.stats().frames_sent, 7);
        assert_eq!(transport.stats().frames_lost_at_destination, 0);
    }

    #[test]
    fn out_of_range_listener_receives_nothing() {
        let mobility = ConstantPositionMobility::install([
            Position::new(0.0, 0.0, 0.0),
            Position::new(5.0, 0.0, 0.0),
            Position::new(5000.0, 0.0, 0.0),
        ]);
        let mut transport = PacketTransport::install(&WifiConfig::default(), 1);
        let mut scheduler = Scheduler::new();
        transport.bind(2);

        transport.send_constant_rate(&mut scheduler, 1, 0, 6000, 200, Duration::ZERO, Duration::from_secs(1));
        let deliveries = run_transport(&mut transport, &mut scheduler, &mobility);

        assert!(deliveries.is_empty());
        // The destination still got its frames.
        assert_eq!(transport.stats().arrivals, transport.stats().frames_sent);
    }

    #[test]
    fn listener_overhears_frames_addressed_elsewhere() {
        let mobility = ConstantPositionMobility::install([
            Position::new(0.0, 0.0, 0.0),
            Position::new(5.0, 0.0, 0.0),
            Position::new(0.0, 5.0, 0.0),
        ]);
        let mut transport = PacketTransport::install(&WifiConfig::default(), 1);
        let mut scheduler = Scheduler::new();
        let vantage = transport.bind(2);

        transport.send_constant_rate(&mut scheduler, 1, 0, 6000, 200, Duration::ZERO, Duration::from_secs(1));
        let deliveries = run_transport(&mut transport, &mut scheduler, &mobility);

        assert_eq!(deliveries.len(), 3);
        assert!(deliveries.iter().all(|(_, d)| d.socket == vantage));
    }

    #[test]
    fn sender_does_not_hear_itself() {
        let mobility = ConstantPositionMobility::install([Position::new(0.0, 0.0, 0.0), Position::new(5.0, 0.0, 0.0)]);
        let mut transport = PacketTransport::install(&WifiConfig::default(), 1);
        let mut scheduler = Scheduler::new();
        transport.bind(1);

        transport.send_constant_rate(&mut scheduler, 1, 0, 6000, 200, Duration::ZERO, Duration::from_secs(1));
        assert!(run_transport(&mut transport, &mut scheduler, &mobility).is_empty());
    }

    #[test]
    fn window_shorter_than_one_interval_sends_nothing() {
        let mut transport = PacketTransport::install(&WifiConfig::default(), 1);
        let mut scheduler: Scheduler<TransportEvent> = Scheduler::new();
        transport.send_constant_rate(&mut scheduler, 1, 0, 6000, 200, Duration::from_secs(1), Duration::from_millis(1200));
        assert!(scheduler.is_idle());
    }
}
