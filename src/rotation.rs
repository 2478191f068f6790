//! Rotation token: the single permit that serialises the two samplers on
//! the shared sensor channel.
//!
//! A sampler acquires the token before sampling and keeps it; the display
//! task releases it at the end of every refresh. The permit count is capped
//! at one, so a release while the permit is already available is refused
//! instead of minting a second permit.
//!
//! ```text
//!  DriverSampler ──acquire──┐                ┌──release── Presentation
//!                           ▼                │
//!                     [ permit (cap 1) ] ◀───┘
//!                           ▲
//!  PassengerSampler ─acquire┘
//! ```
//!
//! Both samplers routinely wait at the same time, so every waiter keeps its
//! own waker slot. A release wakes all of them; the first to run takes the
//! permit and the others register again.

use core::cell::RefCell;
use core::future::poll_fn;
use core::sync::atomic::{AtomicU32, Ordering};
use core::task::Poll;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use log::trace;

/// Tasks that may wait on the token at once: one per seat.
pub const MAX_WAITERS: usize = 2;

struct Permit {
    available: bool,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// Single-permit token with one waker slot per waiting sampler.
pub struct RotationToken {
    permit: Mutex<CriticalSectionRawMutex, RefCell<Permit>>,
    acquired: AtomicU32,
    released: AtomicU32,
}

impl Default for RotationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationToken {
    /// Create the token with its permit available.
    pub const fn new() -> Self {
        Self {
            permit: Mutex::new(RefCell::new(Permit {
                available: true,
                waiters: MultiWakerRegistration::new(),
            })),
            acquired: AtomicU32::new(0),
            released: AtomicU32::new(0),
        }
    }

    fn take(&self) -> bool {
        self.permit.lock(|p| {
            let mut p = p.borrow_mut();
            core::mem::replace(&mut p.available, false)
        })
    }

    /// Wait (unbounded) for the permit.
    pub async fn acquire(&self) {
        poll_fn(|cx| {
            self.permit.lock(|p| {
                let mut p = p.borrow_mut();
                if p.available {
                    p.available = false;
                    Poll::Ready(())
                } else {
                    p.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await;
        self.acquired.fetch_add(1, Ordering::AcqRel);
    }

    /// Take the permit if it is available right now.
    pub fn try_acquire(&self) -> bool {
        let taken = self.take();
        if taken {
            self.acquired.fetch_add(1, Ordering::AcqRel);
        }
        taken
    }

    /// Hand the permit back. Returns `false` if it was already available.
    pub fn release(&self) -> bool {
        let returned = self.permit.lock(|p| {
            let mut p = p.borrow_mut();
            if p.available {
                return false;
            }
            p.available = true;
            p.waiters.wake();
            true
        });
        if returned {
            self.released.fetch_add(1, Ordering::AcqRel);
        } else {
            trace!("rotation: release refused, permit already available");
        }
        returned
    }

    /// Whether the permit is currently free.
    pub fn is_available(&self) -> bool {
        self.permit.lock(|p| p.borrow().available)
    }

    /// Successful acquisitions so far.
    pub fn acquired(&self) -> u32 {
        self.acquired.load(Ordering::Acquire)
    }

    /// Successful releases so far.
    pub fn released(&self) -> u32 {
        self.released.load(Ordering::Acquire)
    }

    /// Holders right now: `acquired - released`, always 0 or 1.
    pub fn outstanding(&self) -> u32 {
        self.acquired().saturating_sub(self.released())
    }
}
