//! Python bindings for hello using PyO3.
//!
//! Builds the extension module `proj` with the sub-module `proj.hello`.
//! On import the module probes for the optional `vxl` library through
//! `importlib` and imports it only if it can be found.
//!
//! ## Design
//!
//! **Bindings do not define semantics.** The namespace layout, the function
//! table and the sibling policy all come from `hello-core`. This crate maps
//! each registered function to its PyO3 wrapper and supplies Python's own
//! module finder and importer.

use pyo3::exceptions::{PyImportError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyCFunction, PyDict};

use hello_core::{
    self as core, Availability, Bootstrap, BootstrapError, ImportError, ModuleFinder,
    ModuleImporter, Namespace, ParentsFirst, Point2,
};

// Shared binding infrastructure (IR types)
use hello_bindings_core::{IRPoint2, IRPoint3, ToIR};

/// Python-compatible 2D point.
#[pyclass(name = "Point2", eq)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PyPoint2 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
}

#[pymethods]
impl PyPoint2 {
    #[new]
    pub fn new(x: f64, y: f64) -> Self {
        PyPoint2 { x, y }
    }

    fn __repr__(&self) -> String {
        format!("Point2(x={}, y={})", self.x, self.y)
    }
}

impl From<PyPoint2> for Point2<f64> {
    fn from(p: PyPoint2) -> Self {
        IRPoint2 { x: p.x, y: p.y }.into()
    }
}

/// Python-compatible 3D point.
#[pyclass(name = "Point3", eq)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PyPoint3 {
    #[pyo3(get)]
    pub x: f64,
    #[pyo3(get)]
    pub y: f64,
    #[pyo3(get)]
    pub z: f64,
}

impl From<IRPoint3> for PyPoint3 {
    fn from(p: IRPoint3) -> Self {
        PyPoint3 {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

#[pymethods]
impl PyPoint3 {
    #[new]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        PyPoint3 { x, y, z }
    }

    /// Coordinates as an `(x, y, z)` tuple.
    pub fn to_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    fn __repr__(&self) -> String {
        format!("Point3(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

/// A Foo Function that returns 1
#[pyfunction]
pub fn foo() -> i32 {
    core::foo()
}

/// Lift a 2D point to 3D, keeping x and y and setting z to 1.
///
/// Accepts a `Point2`, an `(x, y)` tuple, or any object with `x` and `y`
/// attributes (such as `vxl.vgl.point_2d`).
#[pyfunction]
pub fn dummy_2_to_3(point: &Bound<'_, PyAny>) -> PyResult<PyPoint3> {
    let p = extract_point2(point)?;
    Ok(core::dummy_2_to_3(p).to_ir().into())
}

fn extract_point2(obj: &Bound<'_, PyAny>) -> PyResult<Point2<f64>> {
    if let Ok(p) = obj.extract::<PyPoint2>() {
        return Ok(p.into());
    }
    if let Ok((x, y)) = obj.extract::<(f64, f64)>() {
        return Ok(Point2::new(x, y));
    }
    match (obj.getattr("x"), obj.getattr("y")) {
        (Ok(x), Ok(y)) => Ok(Point2::new(x.extract()?, y.extract()?)),
        _ => Err(PyTypeError::new_err(format!(
            "dummy_2_to_3() expected a 2D point, got {}",
            obj.get_type().name()?
        ))),
    }
}

/// Check whether a Python module can be imported, without importing it.
#[pyfunction]
pub fn import_exists(py: Python<'_>, library_name: &str) -> bool {
    core::probe(&ParentsFirst(ImportlibFinder { py }), library_name)
}

/// Module discovery through `importlib.util.find_spec`.
///
/// `find_spec("a.b")` imports the package `a`, so this is always used behind
/// [`ParentsFirst`]: a child of a missing package is unavailable without
/// importing anything. A parent that is found does get imported, and an
/// exception other than `ImportError` or `ValueError` raised while it
/// initialises is reported as a discovery error.
struct ImportlibFinder<'py> {
    py: Python<'py>,
}

impl ModuleFinder for ImportlibFinder<'_> {
    fn find(&self, name: &str) -> Availability {
        let util = match PyModule::import_bound(self.py, "importlib.util") {
            Ok(util) => util,
            Err(e) => return Availability::DiscoveryError(e.to_string()),
        };
        match util.call_method1("find_spec", (name,)) {
            Ok(spec) if spec.is_none() => Availability::Unavailable,
            Ok(_) => Availability::Available,
            // A missing parent package or a malformed name
            Err(e)
                if e.is_instance_of::<PyImportError>(self.py)
                    || e.is_instance_of::<PyValueError>(self.py) =>
            {
                Availability::Unavailable
            }
            Err(e) => Availability::DiscoveryError(e.to_string()),
        }
    }
}

/// Imports through the interpreter's import system.
struct PythonImporter<'py> {
    py: Python<'py>,
}

impl ModuleImporter for PythonImporter<'_> {
    fn import(&mut self, name: &str) -> Result<(), ImportError> {
        PyModule::import_bound(self.py, name)
            .map(|_| ())
            .map_err(|e| ImportError {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

type Wrapper = for<'py> fn(&Bound<'py, PyModule>) -> PyResult<Bound<'py, PyCFunction>>;

fn wrap_foo<'py>(m: &Bound<'py, PyModule>) -> PyResult<Bound<'py, PyCFunction>> {
    wrap_pyfunction!(foo, m)
}

fn wrap_dummy_2_to_3<'py>(m: &Bound<'py, PyModule>) -> PyResult<Bound<'py, PyCFunction>> {
    wrap_pyfunction!(dummy_2_to_3, m)
}

/// PyO3 wrapper for each name in `hello_core::HELLO_FUNCTIONS`.
static PY_WRAPPERS: &[(&str, Wrapper)] = &[("foo", wrap_foo), ("dummy_2_to_3", wrap_dummy_2_to_3)];

fn wrapper_for(name: &str) -> Option<Wrapper> {
    PY_WRAPPERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, w)| *w)
}

/// Publish `ns` into `m`: every function under its registered name, a
/// `__catalog__` dict of descriptions, and one Python sub-module per child
/// namespace (also entered in `sys.modules` so `import proj.hello` works).
fn mount(m: &Bound<'_, PyModule>, ns: &Namespace, qualified: &str) -> PyResult<()> {
    let py = m.py();
    m.setattr("__doc__", ns.doc())?;

    let catalog = PyDict::new_bound(py);
    for spec in ns.functions() {
        let wrap = wrapper_for(spec.name).ok_or_else(|| {
            PyRuntimeError::new_err(format!("No Python wrapper for {}.{}", qualified, spec.name))
        })?;
        m.add(spec.name, wrap(m)?)?;
        catalog.set_item(spec.name, spec.description)?;
    }
    m.add("__catalog__", catalog)?;

    let sys_modules = PyModule::import_bound(py, "sys")?.getattr("modules")?;
    for child in ns.submodules() {
        let child_name = format!("{}.{}", qualified, child.name());
        let sub = PyModule::new_bound(py, child.name())?;
        mount(&sub, child, &child_name)?;
        m.add_submodule(&sub)?;
        sub.setattr("__name__", &child_name)?;
        sys_modules.set_item(&child_name, &sub)?;
        tracing::debug!(module = %child_name, "Mounted sub-module");
    }
    Ok(())
}

fn bootstrap_error(e: BootstrapError) -> PyErr {
    match e {
        BootstrapError::Discovery { .. } | BootstrapError::Import(_) => {
            PyImportError::new_err(e.to_string())
        }
        BootstrapError::Registry(_) => PyRuntimeError::new_err(e.to_string()),
    }
}

/// hello Python module.
#[pymodule]
fn proj(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add_class::<PyPoint2>()?;
    m.add_class::<PyPoint3>()?;
    m.add_function(wrap_pyfunction!(import_exists, m)?)?;

    let finder = ParentsFirst(ImportlibFinder { py });
    let mut importer = PythonImporter { py };
    let module = Bootstrap::default()
        .run(&finder, &mut importer)
        .map_err(bootstrap_error)?;

    mount(m, module.namespace(), module.namespace().name())?;
    // Imported for their side effects only, never re-exported
    m.add("__siblings__", module.siblings())?;
    Ok(())
}
