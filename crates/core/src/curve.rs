use serde::{Deserialize, Serialize};

/// Plot-ready sequence of points, serialized as two equal-length arrays.
///
/// Points keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "CurveArrays<X, Y>",
    bound(deserialize = "X: Deserialize<'de>, Y: Deserialize<'de>")
)]
pub struct Curve<X, Y> {
    x: Vec<X>,
    y: Vec<Y>,
}

/// Wire form of a [`Curve`] before the length check.
#[derive(Deserialize)]
struct CurveArrays<X, Y> {
    x: Vec<X>,
    y: Vec<Y>,
}

impl<X, Y> TryFrom<CurveArrays<X, Y>> for Curve<X, Y> {
    type Error = String;

    fn try_from(arrays: CurveArrays<X, Y>) -> Result<Self, Self::Error> {
        if arrays.x.len() != arrays.y.len() {
            return Err(format!(
                "curve has {} x values but {} y values",
                arrays.x.len(),
                arrays.y.len()
            ));
        }
        Ok(Self {
            x: arrays.x,
            y: arrays.y,
        })
    }
}

/// (content position, action number) per user.
pub type RouteCurve = Curve<usize, usize>;

/// (video time, concurrent watchers) per video.
pub type WatchingCurve = Curve<f64, i64>;

impl<X, Y> Curve<X, Y> {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    pub fn push(&mut self, x: X, y: Y) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn x(&self) -> &[X] {
        &self.x
    }

    pub fn y(&self) -> &[Y] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&X, &Y)> {
        self.x.iter().zip(&self.y)
    }
}

impl<X, Y> Default for Curve<X, Y> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X, Y> FromIterator<(X, Y)> for Curve<X, Y> {
    fn from_iter<I: IntoIterator<Item = (X, Y)>>(iter: I) -> Self {
        let (x, y) = iter.into_iter().unzip();
        Self { x, y }
    }
}
