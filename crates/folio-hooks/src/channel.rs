//! Typed channel handles.

use std::fmt;
use std::marker::PhantomData;

/// A channel whose handlers may replace the value.
///
/// Each handler sees the value produced by the previous one and returns
/// either a replacement or `None` to keep it. With no handlers the input is
/// returned unchanged.
pub struct ReplaceChannel<T> {
    name: &'static str,
    _value: PhantomData<fn(T) -> T>,
}

/// A channel whose handlers edit the value in place.
///
/// Used for accumulators (fragment lists) and for read-mostly contexts where
/// handlers mainly observe.
pub struct MutateChannel<T> {
    name: &'static str,
    _value: PhantomData<fn(&mut T)>,
}

macro_rules! channel_impls {
    ($channel:ident) => {
        impl<T> $channel<T> {
            /// Declare a channel.
            #[must_use]
            pub const fn new(name: &'static str) -> Self {
                Self {
                    name,
                    _value: PhantomData,
                }
            }

            /// Channel name as used by plugins.
            #[must_use]
            pub const fn name(&self) -> &'static str {
                self.name
            }
        }

        impl<T> Clone for $channel<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $channel<T> {}

        impl<T> fmt::Debug for $channel<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($channel)).field(&self.name).finish()
            }
        }
    };
}

channel_impls!(ReplaceChannel);
channel_impls!(MutateChannel);
