//! SOS countdown controller
//!
//! The controller is either disarmed or armed. Arming starts a ten second
//! countdown driven by one-second alarms; cancelling before it runs out
//! disarms without sending anything, letting it run out sends the alert to
//! every contact and disarms. Quick messages and emergency calls bypass the
//! countdown entirely.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    constants::sos::{COUNTDOWN_SECONDS, TICK_SECONDS, VIBRATION_PATTERN},
    device::DeviceId,
    incident::IncidentId,
    session::Tunnel,
};

use super::{
    alert::{Alert, Broadcast, QuickMessage, QuickMessageCategory},
    capabilities::{Capabilities, Location},
    contacts::{self, Contact},
};

/// Update messages sent to the view by the controller
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// The countdown started
    Activated {
        /// Seconds until the alert goes out
        countdown: u32,
    },
    /// The countdown moved on
    Countdown {
        /// Seconds left
        remaining: u32,
    },
    /// The countdown was cancelled, nothing was sent
    Cancelled,
    /// The countdown alert went out
    AlertDispatched {
        /// Reference number of the alert
        reference: IncidentId,
        /// Number of contacts the alert was relayed to
        contacts: usize,
        /// Location attached, if known
        location: Option<Location>,
    },
    /// A quick message went out
    QuickMessageSent {
        /// Category of the message
        category: QuickMessageCategory,
        /// Reference number of the message
        reference: IncidentId,
    },
    /// A call is being placed
    Calling {
        /// Name of the contact, or the number when unknown
        name: String,
        /// Number as displayed
        number: String,
    },
    /// Dialing failed and the number was copied for manual dialing
    NumberCopied {
        /// Number as displayed
        number: String,
    },
    /// A location fix arrived
    LocationResolved(Location),
}

/// Alarm messages driving the SOS countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second has passed for the given arming
    Tick {
        /// Arming number that scheduled the tick
        arming: u64,
    },
}

/// Snapshot of the controller for a view that is (re)rendered
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Idle, ready to arm
    Disarmed {
        /// Location, if known
        location: Option<Location>,
    },
    /// Countdown running
    Armed {
        /// Seconds left
        countdown: u32,
        /// Location, if known
        location: Option<Location>,
    },
}

/// Result of an emergency call attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    /// The dialer was opened
    Dialing,
    /// Dialing failed; the number was copied to the clipboard
    Copied,
    /// Neither dialing nor copying worked
    Unavailable,
}

/// The SOS state machine of one device
#[derive(Debug)]
pub struct Controller {
    capabilities: Capabilities,
    contacts: Vec<Contact>,
    device: DeviceId,
    device_info: String,

    // Runtime State
    armed: bool,
    countdown: u32,
    location: Option<Location>,
    /// Incremented on every activation so older ticks are ignored
    arming: u64,
    /// Most recent broadcast relayed
    last_broadcast: Option<Broadcast>,
    alerts_dispatched: usize,
    quick_messages: EnumMap<QuickMessageCategory, usize>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

impl Controller {
    /// Creates a disarmed controller alerting the standard contacts
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            contacts: contacts::standard(),
            device: DeviceId::new(),
            device_info: String::from("unknown device"),
            armed: false,
            countdown: 0,
            location: None,
            arming: 0,
            last_broadcast: None,
            alerts_dispatched: 0,
            quick_messages: EnumMap::default(),
        }
    }

    /// Replaces the contact list
    #[must_use]
    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    /// Sets the device description attached to alerts
    #[must_use]
    pub fn with_device_info(mut self, device_info: &str) -> Self {
        device_info.clone_into(&mut self.device_info);
        self
    }

    /// Arms the controller and starts the countdown
    ///
    /// Does nothing and returns `false` when already armed. Otherwise asks
    /// for a location fix if none is known yet, announces the countdown and
    /// schedules the first tick.
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for view notifications
    /// * `S` - Function type for scheduling alarm messages
    pub fn activate<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        mut schedule_message: S,
    ) -> bool {
        if self.armed {
            tracing::debug!(countdown = self.countdown, "sos already armed");
            return false;
        }

        self.arming += 1;
        self.armed = true;
        self.countdown = COUNTDOWN_SECONDS;
        tracing::info!(arming = self.arming, countdown = self.countdown, "sos activated");

        if self.location.is_none() {
            if let Err(e) = self.capabilities.geolocation.request_position() {
                tracing::debug!(error = %e, "geolocation unavailable");
            }
        }

        self.speak(&format!(
            "Emergency SOS activated. Alert will be sent in {COUNTDOWN_SECONDS} seconds."
        ));
        tunnel.send_message(
            &UpdateMessage::Activated {
                countdown: self.countdown,
            }
            .into(),
        );

        self.schedule_tick(&mut schedule_message);
        true
    }

    /// Disarms the controller without sending anything
    ///
    /// Returns `false` and does nothing when not armed.
    pub fn cancel<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        if !self.armed {
            return false;
        }

        self.armed = false;
        tracing::info!(
            arming = self.arming,
            remaining = self.countdown,
            "sos cancelled"
        );
        self.countdown = 0;
        self.capabilities.speech.cancel();
        tunnel.send_message(&UpdateMessage::Cancelled.into());

        true
    }

    /// Advances the countdown by one second
    ///
    /// Has no effect unless armed. When the countdown reaches zero the
    /// controller disarms and dispatches the alert.
    pub fn tick<T: Tunnel>(&mut self, tunnel: &T) {
        if !self.armed {
            return;
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.armed = false;
            self.dispatch_alert(tunnel);
        } else {
            tunnel.send_message(
                &UpdateMessage::Countdown {
                    remaining: self.countdown,
                }
                .into(),
            );
        }
    }

    /// Handles a scheduled countdown alarm
    ///
    /// Ticks from an earlier arming, or arriving while disarmed, are
    /// ignored. Otherwise the countdown advances and the next tick is
    /// scheduled while still armed.
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for view notifications
    /// * `S` - Function type for scheduling alarm messages
    pub fn receive_alarm<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        schedule_message: &mut S,
        message: &crate::AlarmMessage,
    ) {
        let crate::AlarmMessage::Sos(AlarmMessage::Tick { arming }) = message else {
            return;
        };

        if *arming != self.arming || !self.armed {
            tracing::debug!(
                alarm_arming = arming,
                arming = self.arming,
                "ignoring stale sos tick"
            );
            return;
        }

        self.tick(tunnel);

        if self.armed {
            self.schedule_tick(schedule_message);
        }
    }

    fn schedule_tick<S: FnMut(crate::AlarmMessage, Duration)>(&self, schedule_message: &mut S) {
        schedule_message(
            AlarmMessage::Tick {
                arming: self.arming,
            }
            .into(),
            Duration::from_secs(TICK_SECONDS),
        );
    }

    /// Sends the countdown alert to every contact
    ///
    /// Delivery is fire-and-forget; each attempt is logged and failures are
    /// not retried. The device then vibrates and confirms aloud when it can.
    /// Dispatching while armed ends the running countdown, so one arming
    /// never sends two alerts.
    pub fn dispatch_alert<T: Tunnel>(&mut self, tunnel: &T) -> IncidentId {
        if self.armed {
            self.armed = false;
            self.countdown = 0;
            self.arming += 1;
        }

        let alert = Alert::new(self.location, self.device, &self.device_info);
        let reference = alert.reference;
        tracing::warn!(
            %reference,
            device = %self.device,
            location = ?self.location,
            "emergency alert dispatched"
        );

        self.broadcast(alert.into());
        self.alerts_dispatched += 1;

        if let Err(e) = self.capabilities.haptics.vibrate(&VIBRATION_PATTERN) {
            tracing::debug!(error = %e, "vibration unavailable");
        }
        self.speak("Emergency alert sent successfully. Help is on the way.");

        tunnel.send_message(
            &UpdateMessage::AlertDispatched {
                reference,
                contacts: self.contacts.len(),
                location: self.location,
            }
            .into(),
        );

        reference
    }

    /// Sends the canned message of `category` right away
    ///
    /// Works whether or not the countdown is running and leaves it alone.
    pub fn send_quick_message<T: Tunnel>(
        &mut self,
        tunnel: &T,
        category: QuickMessageCategory,
    ) -> IncidentId {
        let message = QuickMessage::new(category, self.location);
        let reference = message.reference;
        tracing::warn!(%category, %reference, "emergency message sent");

        self.broadcast(message.into());
        self.quick_messages[category] += 1;

        self.speak(&category.announcement());
        tunnel.send_message(
            &UpdateMessage::QuickMessageSent {
                category,
                reference,
            }
            .into(),
        );

        reference
    }

    fn broadcast(&mut self, broadcast: Broadcast) {
        let reference = broadcast.reference();
        for contact in &self.contacts {
            tracing::info!(
                %reference,
                contact = %contact.name,
                number = %contact.number,
                "alerting contact"
            );
            if let Err(e) = self.capabilities.relay.relay(contact, &broadcast) {
                tracing::warn!(
                    %reference,
                    contact = %contact.name,
                    error = %e,
                    "contact unreachable"
                );
            }
        }
        self.last_broadcast = Some(broadcast);
    }

    fn speak(&self, text: &str) {
        if let Err(e) = self.capabilities.speech.speak(text) {
            tracing::debug!(error = %e, "speech unavailable");
        }
    }

    /// Places a call to `number`
    ///
    /// The number is reduced to its digits and handed to the dialer. If the
    /// platform cannot dial, the digits are copied to the clipboard so the
    /// user can dial by hand.
    pub fn call_emergency<T: Tunnel>(&self, tunnel: &T, number: &str) -> CallOutcome {
        let name = self
            .contacts
            .iter()
            .find(|contact| contact.number == number)
            .map_or_else(|| number.to_owned(), |contact| contact.name.clone());
        let digits = contacts::dial_digits(number);
        if digits.is_empty() {
            tracing::warn!(number, "nothing to dial");
            return CallOutcome::Unavailable;
        }

        tunnel.send_message(
            &UpdateMessage::Calling {
                name,
                number: number.to_owned(),
            }
            .into(),
        );

        let Err(e) = self.capabilities.telephony.dial(&digits) else {
            tracing::info!(number = %digits, "dialer opened");
            return CallOutcome::Dialing;
        };
        tracing::debug!(error = %e, number = %digits, "dialer unavailable, copying number");

        match self.capabilities.clipboard.copy(&digits) {
            Ok(()) => {
                tunnel.send_message(
                    &UpdateMessage::NumberCopied {
                        number: number.to_owned(),
                    }
                    .into(),
                );
                CallOutcome::Copied
            }
            Err(e) => {
                tracing::warn!(error = %e, number = %digits, "could not copy number");
                CallOutcome::Unavailable
            }
        }
    }

    /// Completes the asynchronous location request
    ///
    /// `None` means the lookup failed or was denied; the location stays
    /// unknown and alerts go out without it.
    pub fn resolve_location<T: Tunnel>(&mut self, tunnel: &T, location: Option<Location>) {
        match location {
            Some(location) => {
                tracing::debug!(%location, "location resolved");
                self.location = Some(location);
                tunnel.send_message(&UpdateMessage::LocationResolved(location).into());
            }
            None => tracing::debug!("location access denied"),
        }
    }

    /// Whether the countdown is running
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds left on the countdown (0 when disarmed)
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Last known location
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Identifier of this device
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Contacts alerted on dispatch
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// The most recent broadcast relayed, if any
    pub fn last_broadcast(&self) -> Option<&Broadcast> {
        self.last_broadcast.as_ref()
    }

    /// Number of countdown alerts dispatched so far
    pub fn alerts_dispatched(&self) -> usize {
        self.alerts_dispatched
    }

    /// Number of quick messages sent for `category`
    pub fn quick_messages_sent(&self, category: QuickMessageCategory) -> usize {
        self.quick_messages[category]
    }

    /// Builds a snapshot message for the current state
    pub fn state_message(&self) -> SyncMessage {
        if self.armed {
            SyncMessage::Armed {
                countdown: self.countdown,
                location: self.location,
            }
        } else {
            SyncMessage::Disarmed {
                location: self.location,
            }
        }
    }

    /// Sends the current snapshot through `tunnel`
    pub fn sync<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message().into());
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::sos::capabilities::{
        Clipboard, Error, Geolocation, Haptics, Relay, Speech, Telephony,
    };

    #[derive(Debug, Clone, Default)]
    struct MockTunnel {
        messages: Arc<Mutex<VecDeque<crate::UpdateMessage>>>,
        states: Arc<Mutex<VecDeque<crate::SyncMessage>>>,
    }

    impl MockTunnel {
        fn count(&self, predicate: impl Fn(&UpdateMessage) -> bool) -> usize {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| match m {
                    crate::UpdateMessage::Sos(m) => predicate(m),
                    crate::UpdateMessage::Quiz(_) => false,
                })
                .count()
        }

        fn dispatched(&self) -> usize {
            self.count(|m| matches!(m, UpdateMessage::AlertDispatched { .. }))
        }
    }

    impl Tunnel for MockTunnel {
        fn send_message(&self, message: &crate::UpdateMessage) {
            self.messages.lock().unwrap().push_back(message.clone());
        }

        fn send_state(&self, state: &crate::SyncMessage) {
            self.states.lock().unwrap().push_back(state.clone());
        }
    }

    /// Records every capability call as a line of text
    #[derive(Debug, Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        fail_dial: bool,
        fail_copy: bool,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    impl Geolocation for Recorder {
        fn request_position(&self) -> Result<(), Error> {
            self.record("locate".to_string());
            Ok(())
        }
    }

    impl Speech for Recorder {
        fn speak(&self, text: &str) -> Result<(), Error> {
            self.record(format!("speak:{text}"));
            Ok(())
        }

        fn cancel(&self) {
            self.record("silence".to_string());
        }
    }

    impl Haptics for Recorder {
        fn vibrate(&self, pattern: &[u32]) -> Result<(), Error> {
            self.record(format!("vibrate:{pattern:?}"));
            Ok(())
        }
    }

    impl Telephony for Recorder {
        fn dial(&self, number: &str) -> Result<(), Error> {
            self.record(format!("dial:{number}"));
            if self.fail_dial {
                Err(Error::Unsupported)
            } else {
                Ok(())
            }
        }
    }

    impl Clipboard for Recorder {
        fn copy(&self, text: &str) -> Result<(), Error> {
            self.record(format!("copy:{text}"));
            if self.fail_copy {
                Err(Error::Rejected("denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl Relay for Recorder {
        fn relay(&self, contact: &Contact, broadcast: &Broadcast) -> Result<(), Error> {
            self.record(format!("relay:{}:{}", contact.name, broadcast.reference()));
            Ok(())
        }
    }

    fn capabilities(recorder: &Recorder) -> Capabilities {
        Capabilities::unsupported()
            .with_geolocation(recorder.clone())
            .with_speech(recorder.clone())
            .with_haptics(recorder.clone())
            .with_telephony(recorder.clone())
            .with_clipboard(recorder.clone())
            .with_relay(recorder.clone())
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }

    fn activated(
        recorder: &Recorder,
        tunnel: &MockTunnel,
    ) -> (Controller, Vec<crate::AlarmMessage>) {
        let mut controller = Controller::new(capabilities(recorder));
        let mut alarms = Vec::new();
        assert!(controller.activate(tunnel, |alarm, _| alarms.push(alarm)));
        (controller, alarms)
    }

    #[test]
    fn test_new_controller_disarmed() {
        let controller = Controller::default();
        assert!(!controller.is_armed());
        assert_eq!(controller.countdown(), 0);
        assert_eq!(controller.location(), None);
        assert_eq!(controller.contacts().len(), 4);
    }

    #[test]
    fn test_activate_arms_and_schedules() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let mut controller = Controller::new(capabilities(&recorder));
        let mut scheduled = Vec::new();

        assert!(controller.activate(&tunnel, |alarm, duration| scheduled.push((alarm, duration))));

        assert!(controller.is_armed());
        assert_eq!(controller.countdown(), 10);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].1, Duration::from_secs(1));
        assert!(matches!(
            scheduled[0].0,
            crate::AlarmMessage::Sos(AlarmMessage::Tick { arming: 1 })
        ));
        assert_eq!(recorder.count("locate"), 1);
        assert!(recorder.calls().contains(
            &"speak:Emergency SOS activated. Alert will be sent in 10 seconds.".to_string()
        ));
        assert_eq!(
            tunnel.count(|m| matches!(m, UpdateMessage::Activated { countdown: 10 })),
            1
        );
    }

    #[test]
    fn test_activate_when_armed_is_noop() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&recorder, &tunnel);
        controller.tick(&tunnel);

        let mut scheduled = false;
        assert!(!controller.activate(&tunnel, |_, _| scheduled = true));

        assert!(!scheduled);
        assert_eq!(controller.countdown(), 9);
        assert_eq!(recorder.count("locate"), 1);
    }

    #[test]
    fn test_activate_skips_location_when_known() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let mut controller = Controller::new(capabilities(&recorder));
        controller.resolve_location(
            &tunnel,
            Some(Location {
                latitude: 1.,
                longitude: 2.,
            }),
        );

        controller.activate(&tunnel, |_, _| {});

        assert_eq!(recorder.count("locate"), 0);
    }

    #[test]
    fn test_cancel_when_disarmed_is_noop() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let mut controller = Controller::new(capabilities(&recorder));

        assert!(!controller.cancel(&tunnel));
        assert_eq!(recorder.count("silence"), 0);
        assert_eq!(tunnel.count(|m| matches!(m, UpdateMessage::Cancelled)), 0);
    }

    #[test]
    fn test_cancel_after_three_ticks() {
        init_tracing();
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&recorder, &tunnel);
        for _ in 0..3 {
            controller.tick(&tunnel);
        }
        assert_eq!(controller.countdown(), 7);

        assert!(controller.cancel(&tunnel));

        assert!(!controller.is_armed());
        assert_eq!(controller.countdown(), 0);
        assert_eq!(controller.alerts_dispatched(), 0);
        assert_eq!(tunnel.dispatched(), 0);
        assert_eq!(recorder.count("relay"), 0);
        assert_eq!(recorder.count("silence"), 1);
    }

    #[test]
    fn test_ten_ticks_dispatch_once() {
        init_tracing();
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&recorder, &tunnel);

        for _ in 0..10 {
            controller.tick(&tunnel);
        }

        assert!(!controller.is_armed());
        assert_eq!(controller.countdown(), 0);
        assert_eq!(controller.alerts_dispatched(), 1);
        assert_eq!(tunnel.dispatched(), 1);
        assert_eq!(recorder.count("relay"), 4);
        assert_eq!(recorder.count("vibrate:[200, 100, 200, 100, 200]"), 1);
        assert!(recorder.calls().contains(
            &"speak:Emergency alert sent successfully. Help is on the way.".to_string()
        ));

        controller.tick(&tunnel);
        assert_eq!(controller.countdown(), 0);
        assert_eq!(controller.alerts_dispatched(), 1);
    }

    #[test]
    fn test_countdown_via_alarms() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, mut pending) = activated(&recorder, &tunnel);
        let mut delivered = 0;

        while let Some(alarm) = pending.pop() {
            delivered += 1;
            controller.receive_alarm(&tunnel, &mut |a, _| pending.push(a), &alarm);
        }

        assert_eq!(delivered, 10);
        assert!(!controller.is_armed());
        assert_eq!(tunnel.dispatched(), 1);
        assert_eq!(
            tunnel.count(|m| matches!(m, UpdateMessage::Countdown { .. })),
            9
        );
    }

    #[test]
    fn test_direct_dispatch_ends_countdown() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, alarms) = activated(&recorder, &tunnel);
        controller.tick(&tunnel);

        controller.dispatch_alert(&tunnel);
        assert!(!controller.is_armed());
        assert_eq!(controller.countdown(), 0);

        let mut rescheduled = false;
        controller.receive_alarm(&tunnel, &mut |_, _| rescheduled = true, &alarms[0]);
        for _ in 0..10 {
            controller.tick(&tunnel);
        }

        assert!(!rescheduled);
        assert_eq!(controller.alerts_dispatched(), 1);
        assert_eq!(tunnel.dispatched(), 1);
        assert_eq!(recorder.count("relay"), 4);
    }

    #[test]
    fn test_quick_messages_do_not_count_as_alerts() {
        let tunnel = MockTunnel::default();
        let mut controller = Controller::default();

        controller.send_quick_message(&tunnel, QuickMessageCategory::Weather);
        controller.dispatch_alert(&tunnel);
        controller.send_quick_message(&tunnel, QuickMessageCategory::Weather);

        assert_eq!(controller.alerts_dispatched(), 1);
        assert_eq!(controller.quick_messages_sent(QuickMessageCategory::Weather), 2);
        assert!(matches!(
            controller.last_broadcast(),
            Some(Broadcast::Quick(QuickMessage {
                category: QuickMessageCategory::Weather,
                ..
            }))
        ));
    }

    #[test]
    fn test_stale_tick_after_cancel_is_noop() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, alarms) = activated(&recorder, &tunnel);
        controller.cancel(&tunnel);

        let mut rescheduled = false;
        controller.receive_alarm(&tunnel, &mut |_, _| rescheduled = true, &alarms[0]);

        assert!(!rescheduled);
        assert!(!controller.is_armed());
        assert_eq!(tunnel.dispatched(), 0);
    }

    #[test]
    fn test_stale_tick_from_previous_arming_is_noop() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, old_alarms) = activated(&recorder, &tunnel);
        controller.cancel(&tunnel);
        controller.activate(&tunnel, |_, _| {});

        controller.receive_alarm(&tunnel, &mut |_, _| {}, &old_alarms[0]);

        assert!(controller.is_armed());
        assert_eq!(controller.countdown(), 10);
    }

    #[test]
    fn test_quiz_alarm_ignored() {
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&Recorder::default(), &tunnel);
        let alarm: crate::AlarmMessage = crate::quiz::AlarmMessage::Tick { attempt: 1 }.into();

        controller.receive_alarm(&tunnel, &mut |_, _| {}, &alarm);

        assert_eq!(controller.countdown(), 10);
    }

    #[test]
    fn test_rearm_after_dispatch() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&recorder, &tunnel);
        for _ in 0..10 {
            controller.tick(&tunnel);
        }

        assert!(controller.activate(&tunnel, |_, _| {}));
        assert_eq!(controller.countdown(), 10);
    }

    #[test]
    fn test_dispatch_includes_resolved_location() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&recorder, &tunnel);
        let location = Location {
            latitude: 51.5,
            longitude: -0.12,
        };
        controller.resolve_location(&tunnel, Some(location));

        for _ in 0..10 {
            controller.tick(&tunnel);
        }

        assert_eq!(
            controller.last_broadcast().and_then(Broadcast::location),
            Some(location)
        );
        assert_eq!(
            tunnel.count(|m| matches!(m, UpdateMessage::LocationResolved(_))),
            1
        );
    }

    #[test]
    fn test_denied_location_stays_absent() {
        let tunnel = MockTunnel::default();
        let mut controller = Controller::default();
        controller.resolve_location(&tunnel, None);
        assert_eq!(controller.location(), None);
        assert!(tunnel.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_platform_still_dispatches() {
        let tunnel = MockTunnel::default();
        let mut controller = Controller::default();
        controller.activate(&tunnel, |_, _| {});
        for _ in 0..10 {
            controller.tick(&tunnel);
        }
        assert_eq!(controller.alerts_dispatched(), 1);
        assert_eq!(tunnel.dispatched(), 1);
    }

    #[test]
    fn test_quick_message_sends_immediately() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let mut controller = Controller::new(capabilities(&recorder));

        controller.send_quick_message(&tunnel, QuickMessageCategory::Fire);

        assert!(!controller.is_armed());
        assert_eq!(recorder.count("relay"), 4);
        assert_eq!(controller.quick_messages_sent(QuickMessageCategory::Fire), 1);
        assert_eq!(controller.quick_messages_sent(QuickMessageCategory::Medical), 0);
        assert_eq!(controller.alerts_dispatched(), 0);
        assert!(recorder
            .calls()
            .contains(&"speak:fire emergency alert sent to school administration.".to_string()));
    }

    #[test]
    fn test_quick_message_leaves_countdown_alone() {
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&Recorder::default(), &tunnel);
        controller.tick(&tunnel);

        controller.send_quick_message(&tunnel, QuickMessageCategory::Medical);

        assert!(controller.is_armed());
        assert_eq!(controller.countdown(), 9);
    }

    #[test]
    fn test_call_emergency_dials_digits() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let controller = Controller::new(capabilities(&recorder));

        let outcome = controller.call_emergency(&tunnel, "(555) 123-0001");

        assert_eq!(outcome, CallOutcome::Dialing);
        assert_eq!(recorder.calls(), vec!["dial:5551230001".to_string()]);
        assert!(tunnel.messages.lock().unwrap().iter().any(|m| matches!(
            m,
            crate::UpdateMessage::Sos(UpdateMessage::Calling { name, .. }) if name == "School Security"
        )));
    }

    #[test]
    fn test_call_emergency_falls_back_to_clipboard() {
        let recorder = Recorder {
            fail_dial: true,
            ..Recorder::default()
        };
        let tunnel = MockTunnel::default();
        let controller = Controller::new(capabilities(&recorder));

        let outcome = controller.call_emergency(&tunnel, "(555) 123-0001");

        assert_eq!(outcome, CallOutcome::Copied);
        assert_eq!(
            recorder.calls(),
            vec!["dial:5551230001".to_string(), "copy:5551230001".to_string()]
        );
        assert_eq!(
            tunnel.count(|m| matches!(m, UpdateMessage::NumberCopied { .. })),
            1
        );
    }

    #[test]
    fn test_call_emergency_unavailable() {
        let recorder = Recorder {
            fail_dial: true,
            fail_copy: true,
            ..Recorder::default()
        };
        let tunnel = MockTunnel::default();
        let controller = Controller::new(capabilities(&recorder));

        assert_eq!(
            controller.call_emergency(&tunnel, "911"),
            CallOutcome::Unavailable
        );
        assert_eq!(
            tunnel.count(|m| matches!(m, UpdateMessage::NumberCopied { .. })),
            0
        );
    }

    #[test]
    fn test_call_without_digits_is_unavailable() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let controller = Controller::new(capabilities(&recorder));

        assert_eq!(
            controller.call_emergency(&tunnel, "call me"),
            CallOutcome::Unavailable
        );
        assert!(recorder.calls().is_empty());
        assert!(tunnel.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_call_unknown_number_uses_number_as_name() {
        let tunnel = MockTunnel::default();
        let controller = Controller::default();

        assert_eq!(
            controller.call_emergency(&tunnel, "555-9999"),
            CallOutcome::Unavailable
        );
        assert!(tunnel.messages.lock().unwrap().iter().any(|m| matches!(
            m,
            crate::UpdateMessage::Sos(UpdateMessage::Calling { name, .. }) if name == "555-9999"
        )));
    }

    #[test]
    fn test_state_message() {
        let tunnel = MockTunnel::default();
        let (mut controller, _) = activated(&Recorder::default(), &tunnel);
        assert!(matches!(
            controller.state_message(),
            SyncMessage::Armed { countdown: 10, .. }
        ));

        controller.cancel(&tunnel);
        controller.sync(&tunnel);
        assert!(matches!(
            tunnel.states.lock().unwrap().back(),
            Some(crate::SyncMessage::Sos(SyncMessage::Disarmed { location: None }))
        ));
    }

    #[test]
    fn test_custom_contacts_and_device_info() {
        let recorder = Recorder::default();
        let tunnel = MockTunnel::default();
        let mut controller = Controller::new(capabilities(&recorder))
            .with_contacts(vec![Contact::new(
                "Front Office",
                "555",
                contacts::ContactKind::Campus,
            )])
            .with_device_info("kiosk 3");

        controller.dispatch_alert(&tunnel);

        assert_eq!(recorder.count("relay:Front Office"), 1);
        match controller.last_broadcast() {
            Some(Broadcast::Alert(alert)) => assert_eq!(alert.device_info, "kiosk 3"),
            other => panic!("unexpected broadcast {other:?}"),
        }
    }
}
