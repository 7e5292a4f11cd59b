//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing a period start.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type describing a period end.
#[derive(Clone, Copy, Debug)]
pub struct End;

/// Marker type describing a fresh identifier draw.
#[derive(Clone, Copy, Debug)]
pub struct NextId;
