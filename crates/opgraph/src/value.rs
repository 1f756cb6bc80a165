//! Traced values: the numbers the host program computes with.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};
use std::rc::Rc;

use tracing::warn;

use crate::codec::OpKind;
use crate::node::NodeId;
use crate::recorder::{OpForm, Operand, Recorder, Source};
use crate::trace::Trace;

/// Numeric payload a [`Traced`] value can carry.
///
/// Implemented for the primitive integer and float types.
pub trait Payload:
    Copy
    + PartialEq
    + Default
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
{
    /// `self / rhs`, or `None` for a zero divisor or an overflowing quotient.
    fn checked_div(self, rhs: Self) -> Option<Self>;

    /// `self % rhs`, or `None` for a zero divisor or an overflowing remainder.
    fn checked_rem(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_payload_int {
    ($($t:ty),*) => {$(
        impl Payload for $t {
            #[inline]
            fn checked_div(self, rhs: Self) -> Option<Self> {
                <$t>::checked_div(self, rhs)
            }

            #[inline]
            fn checked_rem(self, rhs: Self) -> Option<Self> {
                <$t>::checked_rem(self, rhs)
            }
        }
    )*};
}

macro_rules! impl_payload_float {
    ($($t:ty),*) => {$(
        impl Payload for $t {
            #[inline]
            fn checked_div(self, rhs: Self) -> Option<Self> {
                (rhs != 0.0).then(|| self / rhs)
            }

            #[inline]
            fn checked_rem(self, rhs: Self) -> Option<Self> {
                (rhs != 0.0).then(|| self % rhs)
            }
        }
    )*};
}

impl_payload_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_payload_float!(f32, f64);

/// A number whose arithmetic is captured into its [`Trace`].
///
/// Each value tracks whether it is a computed result (`calculated`),
/// whether its raw data has already been charged as a memory access
/// (`read`), and which node it currently stands for.
pub struct Traced<T, R> {
    value: T,
    calculated: bool,
    read: Cell<bool>,
    node: NodeId,
    name: String,
    trace: Rc<Trace<R>>,
}

type Apply<T> = fn(T, T) -> Option<T>;

fn skipped<T>(kind: OpKind, result: Option<T>) -> Option<T> {
    if result.is_none() {
        warn!(op = %kind, "zero divisor or overflow, payload left unchanged");
    }
    result
}

fn apply_add<T: Payload>(a: T, b: T) -> Option<T> {
    Some(a + b)
}

fn apply_sub<T: Payload>(a: T, b: T) -> Option<T> {
    Some(a - b)
}

fn apply_mul<T: Payload>(a: T, b: T) -> Option<T> {
    Some(a * b)
}

fn apply_div<T: Payload>(a: T, b: T) -> Option<T> {
    skipped(OpKind::Divide, a.checked_div(b))
}

fn apply_rem<T: Payload>(a: T, b: T) -> Option<T> {
    skipped(OpKind::Modulo, a.checked_rem(b))
}

impl<T, R> Traced<T, R> {
    /// The payload.
    #[inline]
    pub fn value(&self) -> T
    where
        T: Copy,
    {
        self.value
    }

    /// The node this value currently stands for.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether this value is the output of an operation.
    #[inline]
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Whether this value's data has been charged as a memory access.
    #[inline]
    pub fn is_read(&self) -> bool {
        self.read.get()
    }

    /// Symbolic name, empty for anonymous values.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The trace this value records into.
    pub fn trace(&self) -> &Rc<Trace<R>> {
        &self.trace
    }

    pub(crate) fn belongs_to(&self, trace: &Trace<R>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.trace), trace)
    }

    pub(crate) fn mark_result(&mut self, node: NodeId) {
        self.calculated = true;
        self.node = node;
    }

    /// Classify this value as an operand, charging its memory access if
    /// this is its first use as raw data.
    pub(crate) fn operand(&self) -> Operand<'_> {
        let source = if self.calculated {
            Source::Result(self.node)
        } else if self.read.get() {
            Source::Memory { charged: false }
        } else {
            self.read.set(true);
            Source::Memory { charged: true }
        };
        Operand {
            source,
            node: self.node,
            name: &self.name,
        }
    }
}

impl<T: Payload, R: Recorder> Traced<T, R> {
    pub(crate) fn new(trace: &Rc<Trace<R>>, value: T, read: bool, name: String) -> Self {
        trace.value_created();
        Self {
            value,
            calculated: false,
            read: Cell::new(read),
            node: NodeId::UNASSIGNED,
            name,
            trace: Rc::clone(trace),
        }
    }

    fn binary(&self, rhs: &Self, kind: OpKind, apply: Apply<T>) -> Self {
        debug_assert!(rhs.belongs_to(&self.trace), "operands from different traces");
        let node = self
            .trace
            .record(kind, OpForm::Binary, &[self.operand(), rhs.operand()]);
        let value = apply(self.value, rhs.value).unwrap_or(self.value);
        let mut out = Self::new(&self.trace, value, true, String::new());
        out.mark_result(node);
        out
    }

    fn compound(&mut self, rhs: &Self, kind: OpKind, apply: Apply<T>) {
        debug_assert!(rhs.belongs_to(&self.trace), "operands from different traces");
        let node = self
            .trace
            .record(kind, OpForm::Compound, &[self.operand(), rhs.operand()]);
        self.mark_result(node);
        if let Some(value) = apply(self.value, rhs.value) {
            self.value = value;
        }
    }

    /// `self + rhs` as a new result node.
    pub fn add(&self, rhs: &Self) -> Self {
        self.binary(rhs, OpKind::Add, apply_add)
    }

    /// `self - rhs` as a new result node.
    pub fn subtract(&self, rhs: &Self) -> Self {
        self.binary(rhs, OpKind::Subtract, apply_sub)
    }

    /// `self * rhs` as a new result node.
    pub fn multiply(&self, rhs: &Self) -> Self {
        self.binary(rhs, OpKind::Multiply, apply_mul)
    }

    /// `self / rhs` as a new result node.
    ///
    /// A zero divisor (or an overflowing integer quotient) is still
    /// recorded, but the result keeps `self`'s payload.
    pub fn divide(&self, rhs: &Self) -> Self {
        self.binary(rhs, OpKind::Divide, apply_div)
    }

    /// `self % rhs` as a new result node. Zero divisors behave as in
    /// [`divide`](Self::divide).
    pub fn modulo(&self, rhs: &Self) -> Self {
        self.binary(rhs, OpKind::Modulo, apply_rem)
    }

    /// `self + c` for a constant `c`, which is never charged as memory.
    pub fn add_constant(&self, c: T) -> Self {
        let constant = self.trace.constant(c);
        self.add(&constant)
    }

    /// `self += rhs`: `self` becomes the new node.
    pub fn compound_add(&mut self, rhs: &Self) {
        self.compound(rhs, OpKind::Add, apply_add)
    }

    /// `self -= rhs`.
    pub fn compound_subtract(&mut self, rhs: &Self) {
        self.compound(rhs, OpKind::Subtract, apply_sub)
    }

    /// `self *= rhs`.
    pub fn compound_multiply(&mut self, rhs: &Self) {
        self.compound(rhs, OpKind::Multiply, apply_mul)
    }

    /// `self /= rhs`. A zero divisor or overflow leaves the payload unchanged.
    pub fn compound_divide(&mut self, rhs: &Self) {
        self.compound(rhs, OpKind::Divide, apply_div)
    }

    /// `self %= rhs`. A zero divisor or overflow leaves the payload unchanged.
    pub fn compound_modulo(&mut self, rhs: &Self) {
        self.compound(rhs, OpKind::Modulo, apply_rem)
    }

    /// Take over everything from `other`, node id included, regardless of
    /// the recorder's clone rule.
    pub fn assign(&mut self, other: &Self) {
        self.value = other.value;
        self.calculated = other.calculated;
        self.read.set(other.read.get());
        self.node = other.node;
        self.name.clone_from(&other.name);
    }

    /// A copy with the payload negated. Records no operation.
    pub fn negate(&self) -> Self
    where
        T: Neg<Output = T>,
    {
        let mut out = self.clone();
        out.value = -out.value;
        out
    }
}

impl<T: Payload, R: Recorder> Clone for Traced<T, R> {
    /// Copies flags, name and payload. The node id survives only if the
    /// recorder keeps identity on clone.
    fn clone(&self) -> Self {
        self.trace.value_created();
        Self {
            value: self.value,
            calculated: self.calculated,
            read: Cell::new(self.read.get()),
            node: if R::KEEPS_NODE_ON_CLONE {
                self.node
            } else {
                NodeId::UNASSIGNED
            },
            name: self.name.clone(),
            trace: Rc::clone(&self.trace),
        }
    }
}

impl<T, R> Drop for Traced<T, R> {
    fn drop(&mut self) {
        self.trace.value_dropped();
    }
}

impl<T: fmt::Debug, R> fmt::Debug for Traced<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("value", &self.value)
            .field("node", &self.node)
            .field("calculated", &self.calculated)
            .field("read", &self.read.get())
            .field("name", &self.name)
            .finish()
    }
}

impl<T: fmt::Display, R> fmt::Display for Traced<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node: {} value: {}", self.node, self.value)
    }
}

// Comparisons look at payloads only and record nothing.

impl<T: PartialEq, R> PartialEq for Traced<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: PartialOrd, R> PartialOrd for Traced<T, R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

// --- Operator impls (all delegate to the named operations) ---

macro_rules! binary_op {
    ($trait:ident, $method:ident, $named:ident) => {
        impl<T: Payload, R: Recorder> $trait<&Traced<T, R>> for &Traced<T, R> {
            type Output = Traced<T, R>;
            #[inline]
            fn $method(self, rhs: &Traced<T, R>) -> Traced<T, R> {
                Traced::$named(self, rhs)
            }
        }
    };
}

macro_rules! compound_op {
    ($trait:ident, $method:ident, $named:ident) => {
        impl<T: Payload, R: Recorder> $trait<&Traced<T, R>> for Traced<T, R> {
            #[inline]
            fn $method(&mut self, rhs: &Traced<T, R>) {
                self.$named(rhs)
            }
        }

        impl<T: Payload, R: Recorder> $trait<Traced<T, R>> for Traced<T, R> {
            #[inline]
            fn $method(&mut self, rhs: Traced<T, R>) {
                self.$named(&rhs)
            }
        }
    };
}

binary_op!(Add, add, add);
binary_op!(Sub, sub, subtract);
binary_op!(Mul, mul, multiply);
binary_op!(Div, div, divide);
binary_op!(Rem, rem, modulo);

compound_op!(AddAssign, add_assign, compound_add);
compound_op!(SubAssign, sub_assign, compound_subtract);
compound_op!(MulAssign, mul_assign, compound_multiply);
compound_op!(DivAssign, div_assign, compound_divide);
compound_op!(RemAssign, rem_assign, compound_modulo);

impl<T: Payload + Neg<Output = T>, R: Recorder> Neg for &Traced<T, R> {
    type Output = Traced<T, R>;
    #[inline]
    fn neg(self) -> Traced<T, R> {
        self.negate()
    }
}
