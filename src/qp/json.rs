#![allow(non_snake_case)]

use crate::{
    algebra::*,
    error::QpResult,
    ksp::PcType,
    qp::QP,
    qpc::{ConstraintHandler, ConstraintSettings},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};

// A struct very similar to the problem data, but containing only
// plain data types (no shared handles).

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub x: Vec<T>,
    pub Beq: Option<CscMatrix<T>>,
    pub ceq: Option<Vec<T>>,
    pub Bineq: Option<CscMatrix<T>>,
    pub cineq: Option<Vec<T>>,
    pub bounds: Option<JsonBoxData<T>>,
    pub pc: PcType,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonBoxData<T: FloatT> {
    pub is: Option<IndexSet>,
    pub lb: Option<Vec<T>>,
    pub ub: Option<Vec<T>>,
    pub settings: ConstraintSettings<T>,
}

impl<T> QP<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the problem data to `file` as JSON.  Only box constraint
    /// handlers are stored.
    pub fn write_to_file(&self, file: &mut File) -> QpResult<()> {
        let (Beq, ceq) = self.eq();
        let (Bineq, cineq) = self.ineq();

        let bounds = self.qpc().and_then(|qpc| {
            let bx = qpc.constraint().as_box()?;
            Some(JsonBoxData {
                is: qpc.index_set().cloned(),
                lb: bx.lower().map(|v| sanitize(v.to_vec())),
                ub: bx.upper().map(|v| sanitize(v.to_vec())),
                settings: qpc.settings().clone(),
            })
        });

        let json_data = JsonProblemData {
            A: (**self.operator()).clone(),
            b: self.rhs().to_vec(),
            x: self.solution().to_vec(),
            Beq: Beq.cloned(),
            ceq: ceq.map(|c| sanitize(c.to_vec())),
            Bineq: Bineq.cloned(),
            cineq: cineq.map(|c| sanitize(c.to_vec())),
            bounds,
            pc: self.pc(),
        };

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Read a problem written by [`write_to_file`](QP::write_to_file)
    pub fn read_from_file(file: &mut File) -> QpResult<Self> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        let mut qp = QP::new(json_data.A, json_data.b)?;
        qp.set_initial_vector(&json_data.x)?;
        qp.set_eq(json_data.Beq, json_data.ceq.map(desanitize))?;
        qp.set_ineq(json_data.Bineq, json_data.cineq.map(desanitize))?;
        qp.set_pc(json_data.pc);

        if let Some(bounds) = json_data.bounds {
            let lb = bounds.lb.map(|v| SharedVector::new(desanitize(v)));
            let ub = bounds.ub.map(|v| SharedVector::new(desanitize(v)));
            let handler = ConstraintHandler::new_box(bounds.is, lb, ub, bounds.settings)?;
            qp.set_qpc(Some(handler))?;
        }

        Ok(qp)
    }
}

// infinite bounds can't be represented in JSON
fn sanitize<T: FloatT>(mut v: Vec<T>) -> Vec<T> {
    v.scalarop(|x| {
        if x == T::infinity() {
            T::max_value()
        } else if x == -T::infinity() {
            T::min_value()
        } else {
            x
        }
    });
    v
}

fn desanitize<T: FloatT>(mut v: Vec<T>) -> Vec<T> {
    v.scalarop(|x| {
        if x == T::max_value() {
            T::infinity()
        } else if x == T::min_value() {
            -T::infinity()
        } else {
            x
        }
    });
    v
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let A = CscMatrix::from(&[
        [2., -1.], //
        [-1., 2.], //
    ]);
    let mut qp = QP::new(A, vec![1., 1.]).unwrap();
    qp.set_box(
        None,
        Some(SharedVector::from_slice(&[0., f64::NEG_INFINITY])),
        Some(SharedVector::from_slice(&[f64::INFINITY, 2.])),
    )
    .unwrap();
    qp.set_pc(PcType::Jacobi);

    let mut file = tempfile::tempfile().unwrap();
    qp.write_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let qp2 = QP::<f64>::read_from_file(&mut file).unwrap();

    assert_eq!(**qp2.operator(), **qp.operator());
    assert_eq!(qp2.rhs(), qp.rhs());
    assert_eq!(qp2.pc(), PcType::Jacobi);

    let (lb, ub) = qp2.qpc().unwrap().box_get().unwrap();
    assert_eq!(lb.unwrap().to_vec(), vec![0., f64::NEG_INFINITY]);
    assert_eq!(ub.unwrap().to_vec(), vec![f64::INFINITY, 2.]);
}
