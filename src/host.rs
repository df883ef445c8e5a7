//! The cooperative main loop: at most one command, one tick, maybe one frame.

use core::future::Future;

use embassy_futures::yield_now;
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{
        Channel,
        Receiver,
    },
};
use embassy_time::{
    Duration,
    with_timeout,
};
use rand::RngCore;

use crate::{
    config::REQUEST_QUEUE_DEPTH,
    game::Game,
    render::{
        PixelStrip,
        render_if_dirty,
    },
    surface::AuthGate,
    timer::Clock,
    web::{
        Request,
        Response,
        Router,
    },
};

/// Carries requests in and responses out. Must never block.
pub trait Transport {
    /// The next pending request, if one is waiting.
    fn poll(&mut self) -> Option<Request>;

    /// Answer the request most recently returned by [`poll`](Self::poll).
    fn reply(&mut self, response: Response);
}

/// Requests queued by input tasks for the host loop.
pub type RequestQueue<M> = Channel<M, Request, REQUEST_QUEUE_DEPTH>;

/// Transport fed through an `embassy_sync` channel.
///
/// Producers have no reply path, so responses are only logged.
pub struct ChannelTransport<'a, M: RawMutex, const N: usize> {
    requests: Receiver<'a, M, Request, N>,
}

impl<'a, M: RawMutex, const N: usize> ChannelTransport<'a, M, N> {
    pub const fn new(requests: Receiver<'a, M, Request, N>) -> Self {
        Self { requests }
    }
}

impl<M: RawMutex, const N: usize> Transport for ChannelTransport<'_, M, N> {
    fn poll(&mut self) -> Option<Request> {
        self.requests.try_receive().ok()
    }

    fn reply(&mut self, response: Response) {
        debug!("{} {}", response.status, response.body.as_str());
    }
}

/// Wait up to `timeout` for a transport to come up.
///
/// `None` means the game has to run without a command surface.
pub async fn connect<T>(link: impl Future<Output = T>, timeout: Duration) -> Option<T> {
    match with_timeout(timeout, link).await {
        Ok(transport) => {
            info!("Command transport attached");
            Some(transport)
        }
        Err(_) => {
            warn!(
                "No command transport after {} ms, running offline",
                timeout.as_millis()
            );
            None
        }
    }
}

/// Owns the session and everything that touches it.
pub struct HostLoop<R, A, S, T, C> {
    game: Game<R>,
    router: Router<A>,
    strip: S,
    transport: Option<T>,
    clock: C,
}

impl<R, A, S, T, C> HostLoop<R, A, S, T, C>
where
    R: RngCore,
    A: AuthGate,
    S: PixelStrip,
    T: Transport,
    C: Clock,
{
    /// Start a session. Without a transport the simulation still runs, it
    /// just cannot be controlled.
    pub fn new(
        mut game: Game<R>,
        router: Router<A>,
        strip: S,
        transport: Option<T>,
        clock: C,
    ) -> Self {
        game.restart(clock.now());
        if transport.is_none() {
            info!("Starting in offline mode, LED strip only");
        }
        Self {
            game,
            router,
            strip,
            transport,
            clock,
        }
    }

    /// One loop iteration. Returns whether a frame was pushed.
    pub async fn step(&mut self) -> bool {
        if let Some(transport) = self.transport.as_mut()
            && let Some(request) = transport.poll()
        {
            let response = self.router.handle(&mut self.game, &request, self.clock.now());
            transport.reply(response);
        }

        self.game.tick(self.clock.now());

        render_if_dirty(&mut self.game, &mut self.strip).await
    }

    /// Step forever, yielding to other tasks between iterations.
    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
            yield_now().await;
        }
    }

    pub const fn game(&self) -> &Game<R> {
        &self.game
    }

    pub const fn strip(&self) -> &S {
        &self.strip
    }

    pub const fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub const fn is_offline(&self) -> bool {
        self.transport.is_none()
    }
}
